macro_rules! keywords {
    ($($variant:ident => $text:literal, $reserved:literal;)*) => {
        /// SQL words with a meaning in the grammar.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $(
                #[doc = concat!("`", $text, "`")]
                $variant,
            )*
        }

        impl Keyword {
            /// Every keyword, in declaration order.
            pub const VARIANTS: &'static [Keyword] = &[$(Keyword::$variant,)*];

            /// Looks up a word, ignoring ASCII case.
            pub fn lookup(word: &str) -> Option<Self> {
                match word.to_ascii_uppercase().as_str() {
                    $($text => Some(Keyword::$variant),)*
                    _ => None,
                }
            }

            /// Upper-case spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }

            /// Reserved words cannot be used as regular identifiers.
            pub fn is_reserved(self) -> bool {
                match self {
                    $(Keyword::$variant => $reserved,)*
                }
            }
        }
    };
}

keywords! {
    All => "ALL", true;
    And => "AND", true;
    As => "AS", true;
    Asc => "ASC", false;
    Asymmetric => "ASYMMETRIC", true;
    Between => "BETWEEN", true;
    Bigint => "BIGINT", true;
    Boolean => "BOOLEAN", true;
    Breadth => "BREADTH", false;
    By => "BY", true;
    Case => "CASE", true;
    Cast => "CAST", true;
    Char => "CHAR", true;
    Character => "CHARACTER", true;
    Corresponding => "CORRESPONDING", true;
    Cross => "CROSS", true;
    Cube => "CUBE", true;
    Cycle => "CYCLE", true;
    Date => "DATE", true;
    Decimal => "DECIMAL", true;
    Default => "DEFAULT", true;
    Depth => "DEPTH", false;
    Desc => "DESC", false;
    Distinct => "DISTINCT", true;
    Double => "DOUBLE", true;
    Else => "ELSE", true;
    End => "END", true;
    Escape => "ESCAPE", true;
    Except => "EXCEPT", true;
    Exists => "EXISTS", true;
    False => "FALSE", true;
    Fetch => "FETCH", true;
    First => "FIRST", false;
    Float => "FLOAT", true;
    From => "FROM", true;
    Full => "FULL", true;
    Group => "GROUP", true;
    Having => "HAVING", true;
    In => "IN", true;
    Inner => "INNER", true;
    Int => "INT", true;
    Integer => "INTEGER", true;
    Intersect => "INTERSECT", true;
    Interval => "INTERVAL", true;
    Is => "IS", true;
    Join => "JOIN", true;
    Last => "LAST", false;
    Left => "LEFT", true;
    Like => "LIKE", true;
    Natural => "NATURAL", true;
    Next => "NEXT", false;
    Not => "NOT", true;
    Null => "NULL", true;
    Nulls => "NULLS", false;
    Numeric => "NUMERIC", true;
    Offset => "OFFSET", true;
    On => "ON", true;
    Only => "ONLY", true;
    Or => "OR", true;
    Order => "ORDER", true;
    Outer => "OUTER", true;
    Percent => "PERCENT", true;
    Precision => "PRECISION", true;
    Real => "REAL", true;
    Recursive => "RECURSIVE", true;
    Right => "RIGHT", true;
    Rollup => "ROLLUP", true;
    Row => "ROW", true;
    Rows => "ROWS", true;
    Search => "SEARCH", true;
    Select => "SELECT", true;
    Set => "SET", true;
    Smallint => "SMALLINT", true;
    Symmetric => "SYMMETRIC", true;
    Table => "TABLE", true;
    Then => "THEN", true;
    Ties => "TIES", false;
    Time => "TIME", true;
    Timestamp => "TIMESTAMP", true;
    To => "TO", true;
    True => "TRUE", true;
    Union => "UNION", true;
    Unknown => "UNKNOWN", true;
    Using => "USING", true;
    Values => "VALUES", true;
    Varchar => "VARCHAR", true;
    Varying => "VARYING", true;
    When => "WHEN", true;
    Where => "WHERE", true;
    With => "WITH", true;
    Without => "WITHOUT", true;
    Zone => "ZONE", false;
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
