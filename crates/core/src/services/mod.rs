pub mod contribution_service;
pub mod decision_service;
pub mod news_service;
pub mod performance_service;
pub mod return_service;
pub mod rule_service;
