//! ARN 状态转换图

use shared::models::ArnStatus;

/// 从 `from` 出发的合法目标状态
pub const fn allowed_targets(from: ArnStatus) -> &'static [ArnStatus] {
    match from {
        ArnStatus::AwaitingCapture => &[ArnStatus::SubmittedToPersonalization],
        ArnStatus::SubmittedToPersonalization => &[ArnStatus::PendingDelivery],
        ArnStatus::PendingDelivery => &[ArnStatus::Delivered, ArnStatus::CollectedAtShq],
        ArnStatus::Stored => &[ArnStatus::PendingDelivery],
        ArnStatus::Delivered | ArnStatus::CollectedAtShq => &[],
    }
}

/// `from → to` 是否为单条边
pub fn can_transition(from: ArnStatus, to: ArnStatus) -> bool {
    allowed_targets(from).contains(&to)
}
