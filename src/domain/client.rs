// ==========================================
// 客户名单导入 - 客户领域模型
// ==========================================
// 职责: 标准字段定义、列映射、归一化结果与诊断信息
// 红线: 列映射由外部提供,管道只读不推断
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// FieldKind - 字段值类型（决定解析器）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,       // 文本（去空白）
    Account,    // 账号（仅保留数字）
    Number,     // 巴西/普通记法数值
    PercentCdi, // CDI 百分比（× 100）
    Boolean,    // Sim / Não 三态
    Birthday,   // 生日规则（年份 ≥ 2000 视为占位）
}

// ==========================================
// ClientField - 客户标准字段
// ==========================================
// 序列化格式: camelCase（与下游一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientField {
    Name,
    AccountNumber,
    Email,
    Phone,
    Advisor,
    InvestorProfile,
    City,
    State,
    NetWorth,
    TotalInvested,
    MonthlyIncome,
    CdiPercent,
    QualifiedInvestor,
    ActiveClient,
    Birthday,
    Notes,
}

impl ClientField {
    pub const ALL: [ClientField; 16] = [
        ClientField::Name,
        ClientField::AccountNumber,
        ClientField::Email,
        ClientField::Phone,
        ClientField::Advisor,
        ClientField::InvestorProfile,
        ClientField::City,
        ClientField::State,
        ClientField::NetWorth,
        ClientField::TotalInvested,
        ClientField::MonthlyIncome,
        ClientField::CdiPercent,
        ClientField::QualifiedInvestor,
        ClientField::ActiveClient,
        ClientField::Birthday,
        ClientField::Notes,
    ];

    pub fn kind(&self) -> FieldKind {
        match self {
            ClientField::AccountNumber => FieldKind::Account,
            ClientField::NetWorth | ClientField::TotalInvested | ClientField::MonthlyIncome => {
                FieldKind::Number
            }
            ClientField::CdiPercent => FieldKind::PercentCdi,
            ClientField::QualifiedInvestor | ClientField::ActiveClient => FieldKind::Boolean,
            ClientField::Birthday => FieldKind::Birthday,
            ClientField::Name
            | ClientField::Email
            | ClientField::Phone
            | ClientField::Advisor
            | ClientField::InvestorProfile
            | ClientField::City
            | ClientField::State
            | ClientField::Notes => FieldKind::Text,
        }
    }

    /// 序列化名称（camelCase）
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientField::Name => "name",
            ClientField::AccountNumber => "accountNumber",
            ClientField::Email => "email",
            ClientField::Phone => "phone",
            ClientField::Advisor => "advisor",
            ClientField::InvestorProfile => "investorProfile",
            ClientField::City => "city",
            ClientField::State => "state",
            ClientField::NetWorth => "netWorth",
            ClientField::TotalInvested => "totalInvested",
            ClientField::MonthlyIncome => "monthlyIncome",
            ClientField::CdiPercent => "cdiPercent",
            ClientField::QualifiedInvestor => "qualifiedInvestor",
            ClientField::ActiveClient => "activeClient",
            ClientField::Birthday => "birthday",
            ClientField::Notes => "notes",
        }
    }
}

impl fmt::Display for ClientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// ClientImportColumnMapping - 列映射
// ==========================================
// 原始表头文本 → 标准字段
// JSON 形如: {"Conta": "accountNumber", "Nome": "name"}
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientImportColumnMapping(BTreeMap<String, ClientField>);

impl ClientImportColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, header: impl Into<String>, field: ClientField) -> Self {
        self.0.insert(header.into(), field);
        self
    }

    pub fn insert(&mut self, header: impl Into<String>, field: ClientField) {
        self.0.insert(header.into(), field);
    }

    pub fn get(&self, header: &str) -> Option<ClientField> {
        self.0.get(header).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ClientField)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ClientField)> for ClientImportColumnMapping {
    fn from_iter<T: IntoIterator<Item = (String, ClientField)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ==========================================
// ClientPayload - 归一化后的客户数据
// ==========================================
// 尽力而为: 解析失败的字段保持 None
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investor_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_worth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_invested: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdi_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_investor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_client: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,      // 真实出生日期（年份 < 2000）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_day: Option<u32>,             // 仅纪念日（年份 ≥ 2000）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ClientPayload {
    /// 文本类字段写入
    pub fn set_text(&mut self, field: ClientField, value: Option<String>) {
        let slot = match field {
            ClientField::Name => &mut self.name,
            ClientField::AccountNumber => &mut self.account_number,
            ClientField::Email => &mut self.email,
            ClientField::Phone => &mut self.phone,
            ClientField::Advisor => &mut self.advisor,
            ClientField::InvestorProfile => &mut self.investor_profile,
            ClientField::City => &mut self.city,
            ClientField::State => &mut self.state,
            ClientField::Notes => &mut self.notes,
            _ => return,
        };
        *slot = value;
    }

    /// 数值类字段写入（含 CDI 百分比）
    pub fn set_number(&mut self, field: ClientField, value: Option<f64>) {
        let slot = match field {
            ClientField::NetWorth => &mut self.net_worth,
            ClientField::TotalInvested => &mut self.total_invested,
            ClientField::MonthlyIncome => &mut self.monthly_income,
            ClientField::CdiPercent => &mut self.cdi_percent,
            _ => return,
        };
        *slot = value;
    }

    pub fn set_bool(&mut self, field: ClientField, value: Option<bool>) {
        let slot = match field {
            ClientField::QualifiedInvestor => &mut self.qualified_investor,
            ClientField::ActiveClient => &mut self.active_client,
            _ => return,
        };
        *slot = value;
    }
}

// ==========================================
// FieldError - 字段级错误
// ==========================================
// 不阻断行: 行仍返回,错误附带其上
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: ClientField,
    pub row_index: usize,
    pub message: String,
}

// ==========================================
// NormalizedClientRow - 单行归一化结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedClientRow {
    pub row_index: usize,
    pub payload: ClientPayload,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl NormalizedClientRow {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ==========================================
// ImportDiagnostics - 诊断汇总（按行、按列）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDiagnostics {
    pub total_rows: usize,
    pub rows_with_errors: usize,
    pub errors_by_field: BTreeMap<ClientField, usize>,
    pub errors_by_row: BTreeMap<usize, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_from_json() {
        let json = r#"{"Conta": "accountNumber", "Aniversário": "birthday", "% CDI": "cdiPercent"}"#;
        let mapping: ClientImportColumnMapping = serde_json::from_str(json).unwrap();

        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.get("Conta"), Some(ClientField::AccountNumber));
        assert_eq!(mapping.get("Aniversário"), Some(ClientField::Birthday));
        assert_eq!(mapping.get("% CDI"), Some(ClientField::CdiPercent));
        assert_eq!(mapping.get("Nome"), None);
    }

    #[test]
    fn test_field_name_matches_serde() {
        for field in ClientField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn test_payload_skips_unset_fields() {
        let payload = ClientPayload {
            birth_day: Some(10),
            birth_month: Some(5),
            ..Default::default()
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"birthDay": 10, "birthMonth": 5}));
    }
}
