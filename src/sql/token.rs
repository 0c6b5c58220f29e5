//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize
//! to dialect-specific strings. Runtime values are carried by
//! [`Token::Param`] and rendered as numbered placeholders.

use super::dialect::{Dialect, SqlDialect};
use super::value::SqlValue;

/// SQL Token - every element the report templates emit.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    On,
    Join,
    Inner,
    Left,
    GroupBy,
    OrderBy,
    Asc,
    Desc,
    NullsFirst,
    NullsLast,
    Case,
    When,
    Then,
    Else,
    End,
    In,
    Between,
    IsNull,
    IsNotNull,
    Distinct,
    All,
    Any,
    Union,
    With,
    Cast,
    Null,
    True,
    False,

    // === Punctuation ===
    Comma,
    Dot,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    Plus,
    Minus,
    /// Key lookup on a key/value column: `added -> 'building'`
    Arrow,

    // === Whitespace / Formatting ===
    Space,
    Newline,
    Indent(usize),

    // === Dynamic Content ===
    /// Simple identifier (table, column, alias)
    Ident(String),
    /// Qualified identifier: schema.table or just table
    QualifiedIdent {
        schema: Option<String>,
        name: String,
    },
    /// Integer literal
    LitInt(i64),
    /// String literal. Only static template text reaches this variant.
    LitString(String),
    /// Boolean literal
    LitBool(bool),
    /// Type name inside CAST(... AS <type>)
    TypeName(&'static str),

    /// Function name - rendered upper-case
    FunctionName(String),

    /// Bound parameter. Serializes to a placeholder, never to the value.
    Param(SqlValue),
}

impl Token {
    /// Serialize this token to a string for the given dialect.
    ///
    /// A lone [`Token::Param`] has no position, so it renders as the
    /// dialect's first placeholder; use [`TokenStream::render`] for
    /// correctly numbered output.
    pub fn serialize(&self, dialect: Dialect) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Join => "JOIN".into(),
            Token::Inner => "INNER".into(),
            Token::Left => "LEFT".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Asc => "ASC".into(),
            Token::Desc => "DESC".into(),
            Token::NullsFirst => "NULLS FIRST".into(),
            Token::NullsLast => "NULLS LAST".into(),
            Token::Case => "CASE".into(),
            Token::When => "WHEN".into(),
            Token::Then => "THEN".into(),
            Token::Else => "ELSE".into(),
            Token::End => "END".into(),
            Token::In => "IN".into(),
            Token::Between => "BETWEEN".into(),
            Token::IsNull => "IS NULL".into(),
            Token::IsNotNull => "IS NOT NULL".into(),
            Token::Distinct => "DISTINCT".into(),
            Token::All => "ALL".into(),
            Token::Any => "ANY".into(),
            Token::Union => "UNION".into(),
            Token::With => "WITH".into(),
            Token::Cast => "CAST".into(),
            Token::Null => "NULL".into(),
            Token::True => "TRUE".into(),
            Token::False => "FALSE".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),
            Token::Ne => "<>".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Arrow => "->".into(),

            // Whitespace
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => "  ".repeat(*n),

            // Dynamic - dialect-specific formatting
            Token::Ident(name) => dialect.quote_identifier(name),
            Token::QualifiedIdent { schema, name } => match schema {
                Some(s) => format!(
                    "{}.{}",
                    dialect.quote_identifier(s),
                    dialect.quote_identifier(name)
                ),
                None => dialect.quote_identifier(name),
            },
            Token::LitInt(n) => n.to_string(),
            Token::LitString(s) => dialect.quote_string(s),
            Token::LitBool(b) => dialect.format_bool(*b).into(),
            Token::TypeName(name) => name.to_uppercase(),

            Token::FunctionName(name) => name.to_uppercase(),

            Token::Param(_) => dialect.placeholder(1),
        }
    }
}

/// A stream of tokens that can be rendered to SQL plus its bound parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Extend with multiple tokens.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Number of bound parameters in the stream.
    pub fn param_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Param(_)))
            .count()
    }

    /// Render to statement text and the parameters in placeholder order.
    ///
    /// Placeholders are numbered by their position in the text, so the
    /// parameter order depends only on the token order.
    pub fn render(&self, dialect: Dialect) -> (String, Vec<SqlValue>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        for token in &self.tokens {
            match token {
                Token::Param(value) => {
                    params.push(value.clone());
                    sql.push_str(&dialect.placeholder(params.len()));
                }
                other => sql.push_str(&other.serialize(dialect)),
            }
        }
        (sql, params)
    }

    /// Serialize all tokens to a SQL string, dropping the parameters.
    pub fn serialize(&self, dialect: Dialect) -> String {
        self.render(dialect).0
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn indent(&mut self, n: usize) -> &mut Self {
        self.push(Token::Indent(n))
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_serialize() {
        assert_eq!(Token::Select.serialize(Dialect::Postgres), "SELECT");
        assert_eq!(Token::GroupBy.serialize(Dialect::DuckDb), "GROUP BY");
    }

    #[test]
    fn test_ident_serialize() {
        let tok = Token::Ident("changesets".into());
        assert_eq!(tok.serialize(Dialect::Postgres), "\"changesets\"");
    }

    #[test]
    fn test_qualified_ident() {
        let tok = Token::QualifiedIdent {
            schema: Some("public".into()),
            name: "task_history".into(),
        };
        assert_eq!(tok.serialize(Dialect::Postgres), "\"public\".\"task_history\"");
    }

    #[test]
    fn test_string_literal_escaping() {
        let tok = Token::LitString("it's".into());
        assert_eq!(tok.serialize(Dialect::Postgres), "'it''s'");
    }

    #[test]
    fn test_render_numbers_placeholders_in_order() {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident("a".into()))
            .space()
            .push(Token::Eq)
            .space()
            .push(Token::Param(SqlValue::Int(1)))
            .space()
            .push(Token::And)
            .space()
            .push(Token::Ident("b".into()))
            .space()
            .push(Token::Eq)
            .space()
            .push(Token::Param(SqlValue::Text("x".into())));

        let (sql, params) = ts.render(Dialect::Postgres);
        assert_eq!(sql, "\"a\" = $1 AND \"b\" = $2");
        assert_eq!(params, vec![SqlValue::Int(1), SqlValue::Text("x".into())]);
        assert_eq!(ts.param_count(), 2);

        let (sql, _) = ts.render(Dialect::DuckDb);
        assert_eq!(sql, "\"a\" = ? AND \"b\" = ?");
    }

    #[test]
    fn test_param_value_never_in_text() {
        let mut ts = TokenStream::new();
        ts.push(Token::Param(SqlValue::Text("'; DROP TABLE users; --".into())));
        let (sql, params) = ts.render(Dialect::Postgres);
        assert_eq!(sql, "$1");
        assert_eq!(params.len(), 1);
    }
}
