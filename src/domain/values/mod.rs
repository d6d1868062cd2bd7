pub mod action;
pub mod agent_kind;
pub mod allocation;
pub mod confidence;
pub mod position_status;
pub mod sector;
pub mod sentiment;
pub mod trade_direction;
