// ==========================================
// 客户名单导入 - 配置层
// ==========================================
// 职责: 导入管道配置管理,缺省值回退
// 存储: JSON 键值文件
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, default_config_path, ConfigManager};
pub use import_config_trait::ImportConfigReader;
