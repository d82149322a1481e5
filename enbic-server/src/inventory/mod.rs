//! 空白卡库存台账
//!
//! 余额从不存储：`balance(partition) = Σ qty`，分区为中央库 (`user_id IS NULL`)
//! 或某个 officer 的库存。所有扣减都在插入流水后、同一事务内校验扣减前余额。
//!
//! - [`ledger`] - 入库、出库、调整、余额、低库存
//! - [`requests`] - 领卡申请、审批调拨、发放单签字
//! - [`reconcile`] - 区间对账

pub mod ledger;
pub mod reconcile;
pub mod requests;

pub use ledger::{
    adjust, balances, issue_to_personalization, ledger, low_stock_check, receive,
    set_low_stock_threshold,
};
pub use reconcile::reconcile;
pub use requests::{
    create_request, decide, generate_issue_note, list_issue_notes, list_requests,
    read_issue_note_file, sign_issue_note,
};

/// settings 表缺失时的低库存阈值
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 100;
