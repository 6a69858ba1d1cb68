use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user uid)
    pub exp: usize,  // Expiration time (时间戳)
    pub iat: usize,  // Issued at (签发时间)
}

/// 令牌由外部登录服务签发，这里只负责校验；签发接口供运维脚本与测试使用。
pub struct JwtUtils;

impl JwtUtils {
    // 生成带自定义过期时间的 Token
    pub fn generate_token(
        user_uid: &str,
        secret: &str,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user_uid.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let encoding_key = EncodingKey::from_secret(secret.as_ref());
        encode(&Header::default(), &claims, &encoding_key)
    }

    // 验证 JWT token（HS256）
    pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        if secret.is_empty() {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidKeyFormat,
            ));
        }
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_subject() {
        let token = JwtUtils::generate_token("alice", "s3cret", chrono::Duration::minutes(5))
            .unwrap();
        let claims = JwtUtils::verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtUtils::generate_token("alice", "s3cret", chrono::Duration::minutes(5))
            .unwrap();
        assert!(JwtUtils::verify_token(&token, "other").is_err());
        assert!(JwtUtils::verify_token(&token, "").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = JwtUtils::generate_token("alice", "s3cret", chrono::Duration::minutes(-10))
            .unwrap();
        assert!(JwtUtils::verify_token(&token, "s3cret").is_err());
    }
}
