use sea_orm::{
    ColumnTrait, IntoSimpleExpr,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

mod list;
mod write;

pub use list::{
    AdminTransactionFilter, AdminTransactionRow, PAGE_SIZE, Page, TransactionRow,
    UserTransactionFilter, total_pages,
};
pub use write::{CreatedTransaction, NewTransactionCmd, TransactionUpdate};

/// `%needle%` with `%`, `_` and `\` escaped. Folding is ASCII-only, like
/// SQLite's `LOWER()`.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.to_ascii_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Case-insensitive substring match: `LOWER(column) LIKE '%needle%'`.
///
/// `%`, `_` and `\` in `needle` match literally.
fn contains_ci<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(column.into_simple_expr()))
        .like(LikeExpr::new(like_pattern(needle)).escape('\\'))
}
