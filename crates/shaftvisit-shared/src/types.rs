use serde::{Deserialize, Serialize};

/// Work category of a visit detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Maintenance,
    Inspection,
    Emergency,
    #[serde(rename = "Regular Check")]
    RegularCheck,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Maintenance,
        Category::Inspection,
        Category::Emergency,
        Category::RegularCheck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Maintenance => "Maintenance",
            Category::Inspection => "Inspection",
            Category::Emergency => "Emergency",
            Category::RegularCheck => "Regular Check",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// Priority of a visit detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Urgent,
    High,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Urgent, Priority::High, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::High => "High",
            Priority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }
}

/// Mine shaft being visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shaft {
    #[serde(rename = "SOB")]
    Sob,
    #[serde(rename = "Central Shaft")]
    CentralShaft,
    #[serde(rename = "MSV")]
    Msv,
    #[serde(rename = "SYNC")]
    Sync,
}

impl Shaft {
    pub const ALL: [Shaft; 4] = [Shaft::Sob, Shaft::CentralShaft, Shaft::Msv, Shaft::Sync];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shaft::Sob => "SOB",
            Shaft::CentralShaft => "Central Shaft",
            Shaft::Msv => "MSV",
            Shaft::Sync => "SYNC",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

/// Mine site of a visit detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Nkana,
    Mufulira,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Nkana, Location::Mufulira];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Nkana => "Nkana",
            Location::Mufulira => "Mufulira",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

macro_rules! impl_display {
    ($($t:ty),*) => {$(
        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

impl_display!(Category, Priority, Shaft, Location);

/// State of one visit submission as it moves through the sync engine.
///
/// `Rejected`, `Synced`, `QueuedOffline` and `Failed` are terminal for a
/// single attempt; a rejected or failed draft stays editable and can be
/// resubmitted from `Draft` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    Draft,
    Validating,
    Rejected,
    Submitting,
    Synced,
    QueuedOffline,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
        for s in Shaft::ALL {
            assert_eq!(Shaft::parse(s.as_str()), Some(s));
        }
        assert_eq!(Category::parse("Underground Rave"), None);
    }

    #[test]
    fn wire_strings_match_backend() {
        // The backend stores these as plain strings; the serde rename must
        // match the picker values exactly.
        assert_eq!(
            serde_json::to_string(&Category::RegularCheck).unwrap(),
            "\"Regular Check\""
        );
        assert_eq!(serde_json::to_string(&Shaft::Sob).unwrap(), "\"SOB\"");
        assert_eq!(
            serde_json::to_string(&Shaft::CentralShaft).unwrap(),
            "\"Central Shaft\""
        );
        assert_eq!(serde_json::to_string(&Location::Nkana).unwrap(), "\"Nkana\"");
    }
}
