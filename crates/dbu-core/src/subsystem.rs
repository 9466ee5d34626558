//! The independently configured databases touched by an upgrade

use serde::Serialize;
use std::fmt;

/// A logical server component with its own database.
///
/// Variant order is the order in which upgrade scripts are applied; later
/// scripts may rely on schema changes made by earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    /// Membership and identity store (core)
    Ccnet,
    /// File metadata store (core)
    Syncwerk,
    /// Web application store (auxiliary)
    Restapi,
    /// Professional-edition event store, shares the restapi connection
    Syncwevents,
}

impl Subsystem {
    /// All subsystems in application order
    pub const ALL: [Subsystem; 4] = [
        Subsystem::Ccnet,
        Subsystem::Syncwerk,
        Subsystem::Restapi,
        Subsystem::Syncwevents,
    ];

    /// Subsystems whose own config decides the backend
    pub const CONFIGURED: [Subsystem; 3] =
        [Subsystem::Ccnet, Subsystem::Syncwerk, Subsystem::Restapi];

    /// Lowercase name, also the script file stem
    pub fn name(self) -> &'static str {
        match self {
            Subsystem::Ccnet => "ccnet",
            Subsystem::Syncwerk => "syncwerk",
            Subsystem::Restapi => "restapi",
            Subsystem::Syncwevents => "syncwevents",
        }
    }

    /// File name of this subsystem's upgrade script
    pub fn script_file_name(self) -> String {
        format!("{}.sql", self.name())
    }

    /// Whether this subsystem only exists in the professional edition
    pub fn requires_pro(self) -> bool {
        matches!(self, Subsystem::Syncwevents)
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ccnet component database, addressed by the stem of its script file.
///
/// Per-component scripts live at `sql/<version>/sqlite3/ccnet/<stem>.sql`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcnetComponent {
    pub stem: &'static str,
    /// Path of the database file relative to the ccnet directory
    pub relative_path: &'static str,
}

/// Known ccnet component databases
pub const CCNET_COMPONENTS: &[CcnetComponent] = &[
    CcnetComponent {
        stem: "ccnet",
        relative_path: "ccnet.db",
    },
    CcnetComponent {
        stem: "groupmgr",
        relative_path: "GroupMgr/groupmgr.db",
    },
    CcnetComponent {
        stem: "config",
        relative_path: "misc/config.db",
    },
    CcnetComponent {
        stem: "orgmgr",
        relative_path: "OrgMgr/orgmgr.db",
    },
    CcnetComponent {
        stem: "usermgr",
        relative_path: "PeerMgr/usermgr.db",
    },
];

/// Look up a ccnet component database by script stem
pub fn ccnet_component(stem: &str) -> Option<&'static CcnetComponent> {
    CCNET_COMPONENTS.iter().find(|c| c.stem == stem)
}
