//! Database enum types with Diesel serialization.
//!
//! This module provides type-safe enum wrappers for database CHECK constraints.
//! Each enum implements `ToSql` and `FromSql` for automatic conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

use casebook_core::error::CoreError;

/// Case lifecycle state.
///
/// Maps to `case_record.status` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "kebab-case")]
pub enum CaseStatus {
    New,
    InProgress,
    Resolved,
    Closed,
}

impl ToSql<Text, Pg> for CaseStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for CaseStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"new" => Ok(Self::New),
            b"in-progress" => Ok(Self::InProgress),
            b"resolved" => Ok(Self::Resolved),
            b"closed" => Ok(Self::Closed),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl CaseStatus {
    /// Returns the database string representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// True for the states that carry a resolution date.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "in-progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            other => Err(CoreError::invalid_field(
                "status",
                format!("unrecognized status '{other}'"),
            )),
        }
    }
}

/// Case priority.
///
/// Maps to `case_record.priority` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum CasePriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl ToSql<Text, Pg> for CasePriority {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for CasePriority {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"low" => Ok(Self::Low),
            b"medium" => Ok(Self::Medium),
            b"high" => Ok(Self::High),
            b"urgent" => Ok(Self::Urgent),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl CasePriority {
    /// Returns the database string representation of this priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for CasePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CasePriority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(CoreError::invalid_field(
                "priority",
                format!("unrecognized priority '{other}'"),
            )),
        }
    }
}

/// Loan product behind a bank dispute.
///
/// Maps to `bank_detail.loan_type` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "kebab-case")]
pub enum LoanType {
    Personal,
    Home,
    Auto,
    Business,
    Education,
    CreditCard,
    Gold,
}

impl ToSql<Text, Pg> for LoanType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for LoanType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"personal" => Ok(Self::Personal),
            b"home" => Ok(Self::Home),
            b"auto" => Ok(Self::Auto),
            b"business" => Ok(Self::Business),
            b"education" => Ok(Self::Education),
            b"credit-card" => Ok(Self::CreditCard),
            b"gold" => Ok(Self::Gold),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl LoanType {
    /// Returns the database string representation of this loan type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Home => "home",
            Self::Auto => "auto",
            Self::Business => "business",
            Self::Education => "education",
            Self::CreditCard => "credit-card",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispute issue reported against a bank account.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "kebab-case")]
pub enum BankIssue {
    EmiBounce,
    HighInterest,
    RecoveryHarassment,
    Settlement,
    CibilDispute,
    Fraud,
    Foreclosure,
}

impl ToSql<Text, Pg> for BankIssue {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for BankIssue {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"emi-bounce" => Ok(Self::EmiBounce),
            b"high-interest" => Ok(Self::HighInterest),
            b"recovery-harassment" => Ok(Self::RecoveryHarassment),
            b"settlement" => Ok(Self::Settlement),
            b"cibil-dispute" => Ok(Self::CibilDispute),
            b"fraud" => Ok(Self::Fraud),
            b"foreclosure" => Ok(Self::Foreclosure),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl BankIssue {
    /// Returns the database string representation of this issue.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmiBounce => "emi-bounce",
            Self::HighInterest => "high-interest",
            Self::RecoveryHarassment => "recovery-harassment",
            Self::Settlement => "settlement",
            Self::CibilDispute => "cibil-dispute",
            Self::Fraud => "fraud",
            Self::Foreclosure => "foreclosure",
        }
    }
}

impl fmt::Display for BankIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a custom field value.
///
/// Maps to `custom_field.kind` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldKind {
    Text,
    Number,
    Date,
    Email,
    Multiline,
    File,
}

impl ToSql<Text, Pg> for CustomFieldKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for CustomFieldKind {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"text" => Ok(Self::Text),
            b"number" => Ok(Self::Number),
            b"date" => Ok(Self::Date),
            b"email" => Ok(Self::Email),
            b"multiline" => Ok(Self::Multiline),
            b"file" => Ok(Self::File),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl CustomFieldKind {
    /// Returns the database string representation of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Email => "email",
            Self::Multiline => "multiline",
            Self::File => "file",
        }
    }
}

impl fmt::Display for CustomFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request thread state. A thread is `answered` the instant an admin
/// response is recorded.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Open,
    Answered,
}

impl ToSql<Text, Pg> for ThreadStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for ThreadStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"open" => Ok(Self::Open),
            b"answered" => Ok(Self::Answered),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ThreadStatus {
    /// Returns the database string representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Answered => "answered",
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of an append-only timeline entry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Transition,
    Reopen,
    Note,
}

impl ToSql<Text, Pg> for TimelineKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for TimelineKind {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"transition" => Ok(Self::Transition),
            b"reopen" => Ok(Self::Reopen),
            b"note" => Ok(Self::Note),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl TimelineKind {
    /// Returns the database string representation of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transition => "transition",
            Self::Reopen => "reopen",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for TimelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
