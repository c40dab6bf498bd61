use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Image,
    Pdf,
    Document,
    Spreadsheet,
    Text,
    Other,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Pdf => "pdf",
            FileType::Document => "document",
            FileType::Spreadsheet => "spreadsheet",
            FileType::Text => "text",
            FileType::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FileType::Image => "Image",
            FileType::Pdf => "PDF",
            FileType::Document => "Document",
            FileType::Spreadsheet => "Spreadsheet",
            FileType::Text => "Text",
            FileType::Other => "Other",
        }
    }

    /// Unknown stored values fall back to `Other` rather than failing a read.
    pub fn parse(value: &str) -> Self {
        match value {
            "image" => FileType::Image,
            "pdf" => FileType::Pdf,
            "document" => FileType::Document,
            "spreadsheet" => FileType::Spreadsheet,
            "text" => FileType::Text,
            _ => FileType::Other,
        }
    }

    /// Guess the category from magic bytes, then from the file extension.
    pub fn infer(data: &[u8], filename: &str) -> Self {
        if let Some(kind) = infer::get(data) {
            let mime = kind.mime_type();
            if mime.starts_with("image/") {
                return FileType::Image;
            }
            match mime {
                "application/pdf" => return FileType::Pdf,
                "application/msword"
                | "application/rtf"
                | "application/vnd.oasis.opendocument.text"
                | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                    return FileType::Document;
                }
                "application/vnd.ms-excel"
                | "application/vnd.oasis.opendocument.spreadsheet"
                | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                    return FileType::Spreadsheet;
                }
                _ => {}
            }
        }

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "tiff" => FileType::Image,
            "pdf" => FileType::Pdf,
            "doc" | "docx" | "odt" | "rtf" => FileType::Document,
            "xls" | "xlsx" | "ods" | "csv" => FileType::Spreadsheet,
            "txt" | "md" | "log" | "json" | "xml" => FileType::Text,
            _ if std::str::from_utf8(data).is_ok() => FileType::Text,
            _ => FileType::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// No findings is low risk, up to two is medium, anything above is high.
    pub fn from_item_count(count: i64) -> Self {
        match count {
            i64::MIN..=0 => RiskLevel::Low,
            1..=2 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// Kind of sensitive information found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveType {
    Email,
    Phone,
    CreditCard,
    Ssn,
    IpAddress,
    Iban,
    ApiKey,
    #[serde(other)]
    Other,
}

impl SensitiveType {
    pub const DETECTABLE: [SensitiveType; 7] = [
        SensitiveType::Email,
        SensitiveType::Phone,
        SensitiveType::CreditCard,
        SensitiveType::Ssn,
        SensitiveType::IpAddress,
        SensitiveType::Iban,
        SensitiveType::ApiKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitiveType::Email => "email",
            SensitiveType::Phone => "phone",
            SensitiveType::CreditCard => "credit_card",
            SensitiveType::Ssn => "ssn",
            SensitiveType::IpAddress => "ip_address",
            SensitiveType::Iban => "iban",
            SensitiveType::ApiKey => "api_key",
            SensitiveType::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SensitiveType::Email => "Email Address",
            SensitiveType::Phone => "Phone Number",
            SensitiveType::CreditCard => "Credit Card Number",
            SensitiveType::Ssn => "Social Security Number",
            SensitiveType::IpAddress => "IP Address",
            SensitiveType::Iban => "Bank Account (IBAN)",
            SensitiveType::ApiKey => "API Key / Secret",
            SensitiveType::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Self {
        Self::DETECTABLE
            .into_iter()
            .find(|t| t.as_str() == value)
            .unwrap_or(SensitiveType::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Pattern,
    Ml,
    Hybrid,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Pattern => "pattern",
            ModelType::Ml => "ml",
            ModelType::Hybrid => "hybrid",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::Pattern => "Pattern Matching",
            ModelType::Ml => "Machine Learning",
            ModelType::Hybrid => "Hybrid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pattern" => Some(ModelType::Pattern),
            "ml" => Some(ModelType::Ml),
            "hybrid" => Some(ModelType::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(JobStatus::Pending),
            "running" => Some(JobStatus::Running),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}
