use std::collections::BTreeMap;

use google_api_proto::google::spanner::v1 as proto;
use prost_types::value::Kind;

use crate::{QueryOptions, Session, TransactionSelector};

/// The type of a statement parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int64,
    Float64,
    String,
    Bytes,
}

impl ParamType {
    fn code(&self) -> proto::TypeCode {
        match self {
            ParamType::Bool => proto::TypeCode::Bool,
            ParamType::Int64 => proto::TypeCode::Int64,
            ParamType::Float64 => proto::TypeCode::Float64,
            ParamType::String => proto::TypeCode::String,
            ParamType::Bytes => proto::TypeCode::Bytes,
        }
    }
}

impl From<ParamType> for proto::Type {
    fn from(value: ParamType) -> Self {
        proto::Type {
            code: value.code() as i32,
            ..Default::default()
        }
    }
}

/// A value bound to a statement parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Null(ParamType),
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Param {
    pub fn param_type(&self) -> ParamType {
        match self {
            Param::Null(tpe) => *tpe,
            Param::Bool(_) => ParamType::Bool,
            Param::Int64(_) => ParamType::Int64,
            Param::Float64(_) => ParamType::Float64,
            Param::String(_) => ParamType::String,
            Param::Bytes(_) => ParamType::Bytes,
        }
    }
}

// https://github.com/googleapis/googleapis/blob/master/google/spanner/v1/type.proto
impl From<&Param> for prost_types::Value {
    fn from(value: &Param) -> Self {
        let kind = match value {
            Param::Null(_) => Kind::NullValue(prost_types::NullValue::NullValue as i32),
            Param::Bool(b) => Kind::BoolValue(*b),
            Param::Int64(i) => Kind::StringValue(i.to_string()),
            Param::Float64(f) if f.is_nan() => Kind::StringValue("NaN".to_string()),
            Param::Float64(f) if f.is_infinite() => Kind::StringValue(
                if f.is_sign_positive() {
                    "Infinity"
                } else {
                    "-Infinity"
                }
                .to_string(),
            ),
            Param::Float64(f) => Kind::NumberValue(*f),
            Param::String(s) => Kind::StringValue(s.clone()),
            Param::Bytes(b) => Kind::StringValue(base64::encode(b)),
        };
        prost_types::Value { kind: Some(kind) }
    }
}

macro_rules! param_from {
    ($t:ty, $v:ident, $self:ident, $into:expr) => {
        impl From<$t> for Param {
            fn from($self: $t) -> Self {
                Param::$v($into)
            }
        }

        impl From<Option<$t>> for Param {
            fn from(value: Option<$t>) -> Self {
                match value {
                    Some(v) => v.into(),
                    None => Param::Null(ParamType::$v),
                }
            }
        }
    };
}

param_from!(bool, Bool, v, v);
param_from!(i32, Int64, v, i64::from(v));
param_from!(u32, Int64, v, i64::from(v));
param_from!(i64, Int64, v, v);
param_from!(f64, Float64, v, v);
param_from!(String, String, v, v);
param_from!(&str, String, v, v.to_string());
param_from!(Vec<u8>, Bytes, v, v);
param_from!(&[u8], Bytes, v, v.to_vec());

/// A single SQL statement with its named parameters.
///
/// ```
/// use spanner_txn::Statement;
///
/// let statement = Statement::new("UPDATE person SET name = @name WHERE id = @id")
///     .bind("id", 42)
///     .bind("name", "ferris");
/// assert_eq!(statement.params().count(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    sql: String,
    params: BTreeMap<String, Param>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
        }
    }

    /// Binds `value` to the parameter `@name`, replacing any previous binding.
    pub fn bind(mut self, name: &str, value: impl Into<Param>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.params.iter().map(|(name, param)| (name.as_str(), param))
    }

    /// Builds a fresh request for one execution attempt.
    pub(crate) fn to_request(
        &self,
        session: &Session,
        selector: TransactionSelector,
        seqno: i64,
        options: &QueryOptions,
    ) -> proto::ExecuteSqlRequest {
        proto::ExecuteSqlRequest {
            session: session.name().to_string(),
            transaction: Some(selector.into()),
            sql: self.sql.clone(),
            params: Some(prost_types::Struct {
                fields: self
                    .params
                    .iter()
                    .map(|(name, param)| (name.clone(), prost_types::Value::from(param)))
                    .collect(),
            }),
            param_types: self
                .params
                .iter()
                .map(|(name, param)| (name.clone(), proto::Type::from(param.param_type())))
                .collect(),
            query_mode: proto::execute_sql_request::QueryMode::Normal as i32,
            seqno,
            request_options: Some(options.request_options()),
            ..Default::default()
        }
    }
}
