//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table. Timesheet entry statuses live in
//! `timesheet_core::timesheet_status` because the planners need them.

pub use timesheet_core::timesheet_status::StatusId;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up the variant for a database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Lifecycle of tasks and memberships. Neither is ever hard-deleted.
    RecordLifecycle {
        Active = 1,
        Removed = 2,
    }
}

define_status_enum! {
    /// Who created a task.
    TaskOrigin {
        /// Created by the project's manager.
        Manager = 1,
        /// Self-added by a project member; carries the membership id.
        Member = 2,
    }
}

/// SQL predicate selecting active rows of a lifecycle-tracked table.
///
/// Every query path that filters tasks or memberships uses this so the
/// meaning of "active" is defined once.
pub fn active(alias: &str) -> String {
    format!("{alias}.lifecycle_id = {}", RecordLifecycle::Active.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_ids_match_seed_data() {
        assert_eq!(RecordLifecycle::Active.id(), 1);
        assert_eq!(RecordLifecycle::Removed.id(), 2);
    }

    #[test]
    fn task_origin_ids_match_seed_data() {
        assert_eq!(TaskOrigin::Manager.id(), 1);
        assert_eq!(TaskOrigin::Member.id(), 2);
    }

    #[test]
    fn from_id_round_trips() {
        assert_eq!(RecordLifecycle::from_id(2), Some(RecordLifecycle::Removed));
        assert_eq!(TaskOrigin::from_id(3), None);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = RecordLifecycle::Removed.into();
        assert_eq!(id, 2);
    }

    #[test]
    fn active_predicate_uses_alias() {
        assert_eq!(active("t"), "t.lifecycle_id = 1");
    }
}
