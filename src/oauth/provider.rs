//! ID 프로바이더 capability 인터페이스와 공통 ID 토큰 검증
//!
//! 프로바이더마다 다른 것은 서명 키 위치, 허용 issuer 목록, 추가 클레임 규칙뿐입니다.
//! 새 프로바이더는 [`IdentityProvider`]만 구현하면 되고 플로우 엔진은 바뀌지 않습니다.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use log::{debug, warn};

use super::claims::{ClaimExpectations, IdentityClaims};
use super::error::{OAuthError, OAuthResult};
use super::jwks::{Jwk, JwksCache};

pub trait IdentityProvider: Send + Sync {
    /// 로그/세션에 남길 프로바이더 이름
    fn name(&self) -> &str;

    /// JWKS 엔드포인트
    fn cert_url(&self) -> &str;

    /// 허용하는 `iss` 값 목록
    fn issuers(&self) -> &[String];

    /// 서명 검증이 끝난 클레임을 검사합니다.
    ///
    /// 기본 구현은 issuer, audience, nonce를 확인합니다.
    fn verify_claims(&self, claims: &IdentityClaims, expected: &ClaimExpectations) -> OAuthResult<()> {
        validate_standard_claims(self.issuers(), claims, expected)
    }
}

/// OIDC Core 3.1.3.7 기본 클레임 검사
pub fn validate_standard_claims(
    issuers: &[String],
    claims: &IdentityClaims,
    expected: &ClaimExpectations,
) -> OAuthResult<()> {
    if !issuers.iter().any(|issuer| issuer == &claims.iss) {
        return Err(OAuthError::ClaimValidation(format!(
            "허용되지 않은 issuer: {}",
            claims.iss
        )));
    }

    if !claims.aud.contains(&expected.audience) {
        return Err(OAuthError::ClaimValidation(
            "audience가 클라이언트 ID와 일치하지 않습니다".to_string(),
        ));
    }

    if claims.aud.is_multiple() && claims.azp.as_deref() != Some(expected.audience.as_str()) {
        return Err(OAuthError::ClaimValidation(
            "audience가 여러 개인 토큰의 azp가 클라이언트 ID가 아닙니다".to_string(),
        ));
    }

    if let Some(expected_nonce) = &expected.nonce {
        match &claims.nonce {
            Some(nonce) if nonce == expected_nonce => {}
            Some(_) => {
                return Err(OAuthError::ClaimValidation("nonce가 일치하지 않습니다".to_string()));
            }
            None => {
                return Err(OAuthError::ClaimValidation("nonce 클레임이 없습니다".to_string()));
            }
        }
    }

    Ok(())
}

/// ID 토큰의 서명과 클레임을 검증합니다.
///
/// 1. 헤더에서 `alg`(RS256만 허용)와 `kid`를 읽습니다.
/// 2. 프로바이더 JWKS에서 `kid` 키를 찾습니다 (없으면 한 번 갱신).
/// 3. 서명과 `exp`를 검증합니다 (60초 허용 오차).
/// 4. 프로바이더 규칙으로 클레임을 검사합니다.
pub async fn verify_id_token<P>(
    provider: &P,
    jwks: &JwksCache,
    id_token: &str,
    expected: &ClaimExpectations,
) -> OAuthResult<IdentityClaims>
where
    P: IdentityProvider + ?Sized,
{
    let header = jsonwebtoken::decode_header(id_token)
        .map_err(|e| OAuthError::InvalidToken(format!("토큰 헤더 해석 실패: {}", e)))?;

    if header.alg != Algorithm::RS256 {
        return Err(OAuthError::InvalidToken(format!(
            "지원하지 않는 서명 알고리즘: {:?}",
            header.alg
        )));
    }

    let kid = header
        .kid
        .ok_or_else(|| OAuthError::InvalidToken("토큰 헤더에 kid가 없습니다".to_string()))?;

    let jwk = jwks.find_key(provider.cert_url(), &kid).await?;
    let decoding_key = decoding_key(&jwk)?;

    let mut validation = Validation::new(Algorithm::RS256);
    // exp가 현재 시각보다 이르면 거부
    validation.leeway = 0;
    // aud/iss는 프로바이더 규칙에서 검사
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "iss", "sub", "aud"]);

    let data = jsonwebtoken::decode::<IdentityClaims>(id_token, &decoding_key, &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => OAuthError::ExpiredToken,
            _ => OAuthError::InvalidToken(e.to_string()),
        })?;

    let claims = data.claims;
    if let Err(e) = provider.verify_claims(&claims, expected) {
        warn!("{} ID 토큰 클레임 검증 실패: {}", provider.name(), e);
        return Err(e);
    }

    debug!("{} ID 토큰 검증 완료 (kid: {})", provider.name(), kid);
    Ok(claims)
}

fn decoding_key(jwk: &Jwk) -> OAuthResult<DecodingKey> {
    if jwk.kty != "RSA" {
        return Err(OAuthError::InvalidToken(format!("RSA 키가 아닙니다: {}", jwk.kty)));
    }
    if let Some(alg) = jwk.alg.as_deref().filter(|alg| *alg != "RS256") {
        return Err(OAuthError::InvalidToken(format!("키 알고리즘 불일치: {}", alg)));
    }

    let (n, e) = jwk
        .n
        .as_deref()
        .zip(jwk.e.as_deref())
        .ok_or_else(|| OAuthError::InvalidToken("JWK에 n/e 값이 없습니다".to_string()))?;

    DecodingKey::from_rsa_components(n, e)
        .map_err(|e| OAuthError::InvalidToken(format!("JWK 공개키 생성 실패: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::claims::Audience;

    fn claims() -> IdentityClaims {
        IdentityClaims {
            iss: "https://issuer.example.com".to_string(),
            sub: "subject".to_string(),
            aud: Audience::Single("client".to_string()),
            exp: 0,
            iat: 0,
            nonce: Some("n-1".to_string()),
            azp: None,
            email: None,
            email_verified: None,
            name: None,
            given_name: None,
            family_name: None,
            picture: None,
            locale: None,
            hd: None,
        }
    }

    fn issuers() -> Vec<String> {
        vec!["https://issuer.example.com".to_string()]
    }

    fn expected(nonce: Option<&str>) -> ClaimExpectations {
        ClaimExpectations {
            audience: "client".to_string(),
            nonce: nonce.map(str::to_string),
        }
    }

    #[test]
    fn test_standard_claims_pass() {
        assert!(validate_standard_claims(&issuers(), &claims(), &expected(Some("n-1"))).is_ok());
        assert!(validate_standard_claims(&issuers(), &claims(), &expected(None)).is_ok());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let mut claims = claims();
        claims.aud = Audience::Single("someone-else".to_string());

        assert!(matches!(
            validate_standard_claims(&issuers(), &claims, &expected(None)),
            Err(OAuthError::ClaimValidation(_))
        ));
    }

    #[test]
    fn test_multiple_audiences_require_matching_azp() {
        let mut claims = claims();
        claims.aud = Audience::Multiple(vec!["client".to_string(), "other".to_string()]);

        assert!(validate_standard_claims(&issuers(), &claims, &expected(None)).is_err());

        claims.azp = Some("client".to_string());
        assert!(validate_standard_claims(&issuers(), &claims, &expected(None)).is_ok());
    }

    #[test]
    fn test_missing_nonce_rejected_when_expected() {
        let mut claims = claims();
        claims.nonce = None;

        assert!(validate_standard_claims(&issuers(), &claims, &expected(Some("n-1"))).is_err());
    }

    #[test]
    fn test_jwk_without_components_rejected() {
        let jwk = Jwk {
            kty: "RSA".to_string(),
            kid: Some("k".to_string()),
            alg: Some("RS256".to_string()),
            key_use: Some("sig".to_string()),
            n: None,
            e: Some("AQAB".to_string()),
        };

        assert!(matches!(decoding_key(&jwk), Err(OAuthError::InvalidToken(_))));
    }
}
