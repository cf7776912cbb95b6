//! # Service Registry
//!
//! 애플리케이션 시작 시 생성한 인프라/서비스 인스턴스를 타입별로 보관하는
//! 전역 컨테이너입니다. Spring의 `ApplicationContext`와 비슷하게 `main`에서
//! 조립한 컴포넌트를 등록하고, 라우트 구성 단계에서 꺼내 씁니다.
//!
//! ```text
//! main()
//!   ├─ ServiceLocator::set(Arc<RedisClient>)
//!   ├─ ServiceLocator::set(Arc<GoogleAuthService>)
//!   └─ HttpServer::new(|| App::new().app_data(ServiceLocator::get::<GoogleAuthService>()?))
//! ```
//!
//! 등록되지 않은 타입을 요청하면 패닉 대신 `AppError::InternalError`를 반환합니다.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::debug;
use once_cell::sync::Lazy;

use crate::errors::{AppError, AppResult};

type Instances = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// 타입 기반 전역 인스턴스 저장소
pub struct ServiceLocator;

/// 전역 인스턴스 맵. 첫 접근 시 초기화됩니다.
static INSTANCES: Lazy<RwLock<Instances>> = Lazy::new(|| RwLock::new(HashMap::new()));

impl ServiceLocator {
    /// 인스턴스를 등록합니다. 같은 타입이 있으면 교체합니다.
    pub fn set<T: 'static + Send + Sync>(instance: Arc<T>) -> AppResult<()> {
        let mut instances = INSTANCES
            .write()
            .map_err(|_| AppError::InternalError("ServiceLocator lock poisoned".to_string()))?;

        debug!("📦 Registering: {}", short_type_name::<T>());
        instances.insert(TypeId::of::<T>(), instance as Arc<dyn Any + Send + Sync>);
        Ok(())
    }

    /// 등록된 인스턴스를 가져옵니다.
    ///
    /// # Errors
    ///
    /// * `AppError::InternalError` - 등록되지 않은 타입
    pub fn get<T: 'static + Send + Sync>() -> AppResult<Arc<T>> {
        let instances = INSTANCES
            .read()
            .map_err(|_| AppError::InternalError("ServiceLocator lock poisoned".to_string()))?;

        instances
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "Service not registered: {}",
                    short_type_name::<T>()
                ))
            })
    }
}

/// `my_crate::services::auth::GoogleAuthService` → `GoogleAuthService`
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RegisteredOnce(u32);
    struct NeverRegistered;

    #[test]
    fn test_set_then_get_returns_same_instance() {
        let instance = Arc::new(RegisteredOnce(7));
        ServiceLocator::set(instance.clone()).unwrap();

        let resolved = ServiceLocator::get::<RegisteredOnce>().unwrap();

        assert_eq!(resolved.0, 7);
        assert!(Arc::ptr_eq(&instance, &resolved));
    }

    #[test]
    fn test_missing_service_is_internal_error() {
        match ServiceLocator::get::<NeverRegistered>() {
            Err(AppError::InternalError(msg)) => assert!(msg.contains("NeverRegistered")),
            _ => panic!("Expected InternalError"),
        }
    }
}
