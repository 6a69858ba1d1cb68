use sea_orm::DbBackend;

/// 生成第 `index` 个（从 1 开始）参数占位符
///
/// PostgreSQL 使用 `$n`，SQLite 与 MySQL 使用 `?`。
pub fn placeholder(backend: DbBackend, index: usize) -> String {
    match backend {
        DbBackend::Postgres => format!("${index}"),
        _ => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_per_backend() {
        assert_eq!(placeholder(DbBackend::Postgres, 2), "$2");
        assert_eq!(placeholder(DbBackend::Sqlite, 2), "?");
        assert_eq!(placeholder(DbBackend::MySql, 1), "?");
    }
}
