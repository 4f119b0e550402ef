/// A fluent builder for PostgREST table queries.
///
/// Produces the `(name, value)` pairs of the query string; the HTTP layer
/// appends them to `/rest/v1/{table}` and handles URL encoding.
///
/// ```ignore
/// let q = PostgrestQuery::new("recipes")
///     .select("*,author:users(username,avatar_url)")
///     .where_eq("is_published", "true")
///     .order_by("created_at", false)
///     .limit(12)
///     .offset(24);
/// let params = q.build();
/// ```
#[derive(Debug, Clone)]
pub struct PostgrestQuery {
    table: String,
    select: Option<String>,
    conditions: Vec<Condition>,
    order: Vec<(String, bool)>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
    on_conflict: Option<String>,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, String),
    ILike(String, String),
    Lte(String, String),
    In(String, Vec<String>),
    /// Array column contains every value.
    Contains(String, Vec<String>),
    /// Array column shares at least one value.
    Overlaps(String, Vec<String>),
    /// Any of the nested conditions holds.
    Or(Vec<Condition>),
}

/// Characters PostgREST treats as syntax inside filter values.
const RESERVED: &[char] = &[',', '.', ':', '(', ')', '{', '}', '"', '\\', ' '];

fn quote(value: &str) -> String {
    if value.is_empty() || value.contains(RESERVED) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

fn list(values: &[String]) -> String {
    values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(",")
}

impl Condition {
    fn column(&self) -> &str {
        match self {
            Condition::Eq(col, _)
            | Condition::ILike(col, _)
            | Condition::Lte(col, _)
            | Condition::In(col, _)
            | Condition::Contains(col, _)
            | Condition::Overlaps(col, _) => col,
            Condition::Or(_) => "or",
        }
    }

    /// Operator and operand, e.g. `eq.true` or `in.(Easy,Hard)`.
    fn operand(&self, nested: bool) -> String {
        let scalar = |v: &str| if nested { quote(v) } else { v.to_string() };
        match self {
            Condition::Eq(_, val) => format!("eq.{}", scalar(val)),
            Condition::ILike(_, pat) => format!("ilike.{}", scalar(pat)),
            Condition::Lte(_, val) => format!("lte.{}", scalar(val)),
            Condition::In(_, vals) => format!("in.({})", list(vals)),
            Condition::Contains(_, vals) => format!("cs.{{{}}}", list(vals)),
            Condition::Overlaps(_, vals) => format!("ov.{{{}}}", list(vals)),
            Condition::Or(conds) => {
                let inner: Vec<_> = conds
                    .iter()
                    .map(|c| format!("{}.{}", c.column(), c.operand(true)))
                    .collect();
                format!("({})", inner.join(","))
            }
        }
    }
}

impl PostgrestQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            select: None,
            conditions: Vec::new(),
            order: Vec::new(),
            limit_val: None,
            offset_val: None,
            on_conflict: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column list, including embedded resources such as `author:users(username)`.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn where_eq(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn where_lte(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Lte(column.to_string(), value.to_string()));
        self
    }

    pub fn where_in(mut self, column: &str, values: &[&str]) -> Self {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn where_overlaps(mut self, column: &str, values: &[String]) -> Self {
        self.conditions
            .push(Condition::Overlaps(column.to_string(), values.to_vec()));
        self
    }

    /// Free-text match: title or description contains `text` (`ilike`,
    /// `*` wildcards), or the tag array contains it verbatim (`cs`).
    pub fn where_text(mut self, text: &str) -> Self {
        let pattern = format!("*{text}*");
        self.conditions.push(Condition::Or(vec![
            Condition::ILike("title".into(), pattern.clone()),
            Condition::ILike("description".into(), pattern),
            Condition::Contains("tags".into(), vec![text.to_string()]),
        ]));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    /// Conflict target for upserts, e.g. `recipe_id,user_id`.
    pub fn on_conflict(mut self, columns: &str) -> Self {
        self.on_conflict = Some(columns.to_string());
        self
    }

    /// Query-string pairs in a stable order.
    pub fn build(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        for cond in &self.conditions {
            params.push((cond.column().to_string(), cond.operand(false)));
        }
        if !self.order.is_empty() {
            let clauses: Vec<_> = self
                .order
                .iter()
                .map(|(col, asc)| {
                    if *asc {
                        format!("{col}.asc")
                    } else {
                        format!("{col}.desc")
                    }
                })
                .collect();
            params.push(("order".to_string(), clauses.join(",")));
        }
        if let Some(limit) = self.limit_val {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset_val {
            params.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(columns) = &self.on_conflict {
            params.push(("on_conflict".to_string(), columns.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(q: &PostgrestQuery) -> Vec<(String, String)> {
        q.build()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn empty_query() {
        assert!(pairs(&PostgrestQuery::new("recipes")).is_empty());
    }

    #[test]
    fn listing_query() {
        let q = PostgrestQuery::new("recipes")
            .select("*,author:users(username,avatar_url)")
            .where_eq("is_published", "true")
            .order_by("created_at", false)
            .limit(12)
            .offset(24);
        assert_eq!(
            pairs(&q),
            vec![
                pair("select", "*,author:users(username,avatar_url)"),
                pair("is_published", "eq.true"),
                pair("order", "created_at.desc"),
                pair("limit", "12"),
                pair("offset", "24"),
            ]
        );
    }

    #[test]
    fn list_operators_quote_reserved_values() {
        let q = PostgrestQuery::new("recipes")
            .where_in("difficulty", &["Easy", "Hard"])
            .where_overlaps("tags", &["Italian".to_string(), "Comfort Food".to_string()])
            .where_lte("cook_time", "60");
        assert_eq!(
            pairs(&q),
            vec![
                pair("difficulty", "in.(Easy,Hard)"),
                pair("tags", "ov.{Italian,\"Comfort Food\"}"),
                pair("cook_time", "lte.60"),
            ]
        );
    }

    #[test]
    fn text_search_builds_or_group() {
        let q = PostgrestQuery::new("recipes").where_text("truffle");
        assert_eq!(
            pairs(&q),
            vec![pair(
                "or",
                "(title.ilike.*truffle*,description.ilike.*truffle*,tags.cs.{truffle})"
            )]
        );
    }

    #[test]
    fn text_search_quotes_reserved_characters() {
        let q = PostgrestQuery::new("recipes").where_text("mac, cheese");
        let (_, value) = &pairs(&q)[0];
        assert!(value.starts_with("(title.ilike.\"*mac, cheese*\","));
    }

    #[test]
    fn upsert_conflict_target() {
        let q = PostgrestQuery::new("reviews").on_conflict("recipe_id,user_id");
        assert_eq!(pairs(&q), vec![pair("on_conflict", "recipe_id,user_id")]);
    }
}
