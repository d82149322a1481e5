//! Report Models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Report kinds served by `/api/reports/{type}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    PendingCapture,
    Submitted,
    PendingDelivery,
    DeliveryHistory,
    ActivityLog,
}

impl ReportType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReportType::PendingCapture => "pending-capture",
            ReportType::Submitted => "submitted",
            ReportType::PendingDelivery => "pending-delivery",
            ReportType::DeliveryHistory => "delivery-history",
            ReportType::ActivityLog => "activity-log",
        }
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending-capture" => Ok(ReportType::PendingCapture),
            "submitted" => Ok(ReportType::Submitted),
            "pending-delivery" => Ok(ReportType::PendingDelivery),
            "delivery-history" => Ok(ReportType::DeliveryHistory),
            "activity-log" => Ok(ReportType::ActivityLog),
            other => Err(format!("Invalid report type: {}", other)),
        }
    }
}

/// Report filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    pub search: Option<String>,
    pub state: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Paged report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPage {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub rows: Vec<serde_json::Value>,
}
