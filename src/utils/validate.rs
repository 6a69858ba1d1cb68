use once_cell::sync::Lazy;
use regex::Regex;

static UID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.:-]+$").expect("Invalid uid regex"));

/// 校验课程/作业/学生 uid
pub fn validate_uid(uid: &str) -> Result<(), &'static str> {
    // 长度校验：1 <= x <= 64
    if uid.is_empty() || uid.len() > 64 {
        return Err("Identifier length must be between 1 and 64 characters");
    }
    // 格式校验：字母、数字、下划线、点、冒号或连字符
    if !UID_RE.is_match(uid) {
        return Err("Identifier must contain only letters, numbers, '_', '.', ':' or '-'");
    }
    Ok(())
}

/// 常数时间比较，避免通过响应时间猜测共享密钥
pub fn secure_compare(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
