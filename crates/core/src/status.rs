//! Status enums mapping to SMALLINT lookup tables.
//!
//! Each variant's discriminant matches the seed data order (1-based) in the
//! corresponding `*_statuses` table. Serialized as SCREAMING_SNAKE_CASE.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Map a database status ID back to the enum, if known.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Clearance request lifecycle status.
    ClearanceStatus {
        Pending = 1 => "PENDING",
        Rejected = 2 => "REJECTED",
        /// Transient hop between `Rejected` and `Pending`; never committed.
        Resubmitted = 3 => "RESUBMITTED",
        Completed = 4 => "COMPLETED",
    }
}

define_status_enum! {
    /// Decision recorded on an approval action.
    ActionStatus {
        Pending = 1 => "PENDING",
        Approved = 2 => "APPROVED",
        Rejected = 3 => "REJECTED",
    }
}

impl ClearanceStatus {
    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// `Pending -> Pending` is the mid-workflow advance.
    pub fn can_transition_to(self, next: ClearanceStatus) -> bool {
        use ClearanceStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Completed)
                | (Pending, Rejected)
                | (Rejected, Resubmitted)
                | (Resubmitted, Pending)
        )
    }

    /// `Completed` is the only state with no outgoing transition.
    pub fn is_terminal(self) -> bool {
        self == ClearanceStatus::Completed
    }
}

impl ActionStatus {
    /// Approved and rejected actions finalize a step.
    pub fn is_final(self) -> bool {
        matches!(self, ActionStatus::Approved | ActionStatus::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_lookup() {
        for status in [
            ClearanceStatus::Pending,
            ClearanceStatus::Rejected,
            ClearanceStatus::Resubmitted,
            ClearanceStatus::Completed,
        ] {
            assert_eq!(ClearanceStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(ClearanceStatus::from_id(0), None);
        assert_eq!(ActionStatus::from_id(4), None);
    }

    #[test]
    fn resubmission_passes_through_resubmitted() {
        assert!(ClearanceStatus::Rejected.can_transition_to(ClearanceStatus::Resubmitted));
        assert!(ClearanceStatus::Resubmitted.can_transition_to(ClearanceStatus::Pending));
        assert!(!ClearanceStatus::Rejected.can_transition_to(ClearanceStatus::Pending));
    }

    #[test]
    fn completed_has_no_exit() {
        assert!(ClearanceStatus::Completed.is_terminal());
        for next in [
            ClearanceStatus::Pending,
            ClearanceStatus::Rejected,
            ClearanceStatus::Resubmitted,
        ] {
            assert!(!ClearanceStatus::Completed.can_transition_to(next));
        }
    }

    #[test]
    fn only_decisions_are_final() {
        assert!(!ActionStatus::Pending.is_final());
        assert!(ActionStatus::Approved.is_final());
        assert!(ActionStatus::Rejected.is_final());
    }

    #[test]
    fn display_matches_serde() {
        assert_eq!(ClearanceStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(
            serde_json::to_string(&ActionStatus::Approved).unwrap(),
            "\"APPROVED\""
        );
    }
}
