use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(GroupId);
id_newtype!(TaskId);
id_newtype!(TagId);
id_newtype!(NotificationId);
id_newtype!(TokenPackageId);
id_newtype!(TransactionId);
id_newtype!(PaymentHistoryId);

/// Whose wallet a token balance, transaction or payment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum TokenOwner {
    User(UserId),
    Group(GroupId),
}

impl TokenOwner {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Group(_) => "group",
        }
    }

    pub fn raw_id(&self) -> i64 {
        match self {
            Self::User(id) => id.0,
            Self::Group(id) => id.0,
        }
    }

    pub fn from_parts(kind: &str, id: i64) -> Option<Self> {
        match kind {
            "user" => Some(Self::User(UserId(id))),
            "group" => Some(Self::Group(GroupId(id))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenMode {
    #[default]
    Individual,
    Group,
}

impl TokenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Group => "group",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "group" => Self::Group,
            _ => Self::Individual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
    Consume,
    Free,
    AdminAdjust,
    Refund,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Consume => "consume",
            Self::Free => "free",
            Self::AdminAdjust => "admin_adjust",
            Self::Refund => "refund",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "purchase" => Some(Self::Purchase),
            "consume" => Some(Self::Consume),
            "free" => Some(Self::Free),
            "admin_adjust" => Some(Self::AdminAdjust),
            "refund" => Some(Self::Refund),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSpan {
    #[default]
    Short,
    Mid,
    Long,
}

impl TaskSpan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Mid => "mid",
            Self::Long => "long",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "short" | "1" => Some(Self::Short),
            "mid" | "2" => Some(Self::Mid),
            "long" | "3" => Some(Self::Long),
            _ => None,
        }
    }
}
