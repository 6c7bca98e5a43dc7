use serde::{Deserialize, Serialize};

/// Raised when a string does not match any label of the target enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    pub value: String,
    pub kind: &'static str,
}

impl std::fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a valid {}", self.value, self.kind)
    }
}

impl std::error::Error for UnknownLabel {}

/// Where the lead came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    Referral,
    Website,
    #[serde(rename = "Cold Call")]
    ColdCall,
    Event,
}

impl Source {
    /// Display label, also the form stored in the database and in CSV files
    pub fn label(&self) -> &'static str {
        match self {
            Source::Referral => "Referral",
            Source::Website => "Website",
            Source::ColdCall => "Cold Call",
            Source::Event => "Event",
        }
    }

    pub fn all() -> Vec<Source> {
        vec![
            Source::Referral,
            Source::Website,
            Source::ColdCall,
            Source::Event,
        ]
    }

    pub fn parse_label(value: &str) -> Result<Self, UnknownLabel> {
        match value {
            "Referral" => Ok(Source::Referral),
            "Website" => Ok(Source::Website),
            "Cold Call" => Ok(Source::ColdCall),
            "Event" => Ok(Source::Event),
            _ => Err(UnknownLabel {
                value: value.to_string(),
                kind: "Source",
            }),
        }
    }
}

/// How interested the lead is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interest {
    Low,
    Medium,
    High,
}

impl Interest {
    pub fn label(&self) -> &'static str {
        match self {
            Interest::Low => "Low",
            Interest::Medium => "Medium",
            Interest::High => "High",
        }
    }

    pub fn all() -> Vec<Interest> {
        vec![Interest::Low, Interest::Medium, Interest::High]
    }

    pub fn parse_label(value: &str) -> Result<Self, UnknownLabel> {
        match value {
            "Low" => Ok(Interest::Low),
            "Medium" => Ok(Interest::Medium),
            "High" => Ok(Interest::High),
            _ => Err(UnknownLabel {
                value: value.to_string(),
                kind: "Interest",
            }),
        }
    }
}

/// Pipeline stage of the lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    New,
    Contacted,
    Qualified,
    Closed,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::New => "New",
            Status::Contacted => "Contacted",
            Status::Qualified => "Qualified",
            Status::Closed => "Closed",
        }
    }

    pub fn all() -> Vec<Status> {
        vec![
            Status::New,
            Status::Contacted,
            Status::Qualified,
            Status::Closed,
        ]
    }

    pub fn parse_label(value: &str) -> Result<Self, UnknownLabel> {
        match value {
            "New" => Ok(Status::New),
            "Contacted" => Ok(Status::Contacted),
            "Qualified" => Ok(Status::Qualified),
            "Closed" => Ok(Status::Closed),
            _ => Err(UnknownLabel {
                value: value.to_string(),
                kind: "Status",
            }),
        }
    }
}

/// A persisted lead as returned by the listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i32,
    pub name: String,
    pub contact_information: String,
    pub source: Source,
    pub interest: Interest,
    pub status: Status,
    pub assigned_salesperson_name: String,
    pub salesperson_id: Option<i32>,
}

/// A fully validated lead row ready to be written; identity is assigned by
/// the store on insert, or taken from the matched lead on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub contact_information: String,
    pub source: Source,
    pub interest: Interest,
    pub status: Status,
    pub assigned_salesperson_name: String,
    pub salesperson_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadListResponse {
    pub items: Vec<Lead>,
    pub total: u64,
}
