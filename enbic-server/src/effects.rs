//! 提交后副作用
//!
//! 引擎在事务提交后返回 [`Outcome`]：业务结果 + [`Effects`]。
//! HTTP 层通过 `ServerState::apply` 把审计记录交给审计 worker，
//! 并触发提醒重算。副作用失败只记录日志，不影响已返回的结果。

use crate::audit::AuditRecord;

/// 待执行的副作用
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Effects {
    pub audit: Vec<AuditRecord>,
    pub regenerate_reminders: bool,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audit(mut self, record: AuditRecord) -> Self {
        self.audit.push(record);
        self
    }

    pub fn push_audit(&mut self, record: AuditRecord) {
        self.audit.push(record);
    }

    pub fn regenerate_reminders(mut self) -> Self {
        self.regenerate_reminders = true;
        self
    }

    pub fn merge(&mut self, other: Effects) {
        self.audit.extend(other.audit);
        self.regenerate_reminders |= other.regenerate_reminders;
    }

    pub fn is_empty(&self) -> bool {
        self.audit.is_empty() && !self.regenerate_reminders
    }
}

/// 引擎调用结果
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub effects: Effects,
}

impl<T> Outcome<T> {
    pub fn new(value: T, effects: Effects) -> Self {
        Self { value, effects }
    }

    /// 无副作用的结果
    pub fn pure(value: T) -> Self {
        Self::new(value, Effects::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;

    #[test]
    fn test_merge() {
        let mut effects = Effects::new().audit(AuditRecord::new(AuditAction::StockReceived, "ada"));
        effects.merge(Effects::new().regenerate_reminders());
        assert_eq!(effects.audit.len(), 1);
        assert!(effects.regenerate_reminders);
        assert!(!effects.is_empty());
        assert!(Effects::new().is_empty());
    }
}
