use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::redis::RedisClient;
use adapter::repository::auth::AuthRepositoryImpl;
use adapter::repository::health::HealthCheckRepositoryImpl;
use adapter::repository::reservation::ReservationRepositoryImpl;
use adapter::repository::space::{LocalSpaceResolverImpl, RemoteSpaceResolverImpl};
use kernel::model::reservation::period::DurationLimits;
use kernel::repository::auth::AuthRepository;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::reservation::ReservationRepository;
use kernel::repository::space::SpaceResolver;
use shared::config::{AppConfig, SpaceResolutionMode};
use shared::error::AppResult;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    space_resolver: Arc<dyn SpaceResolver>,
    auth_repository: Arc<dyn AuthRepository>,
}

impl AppRegistry {
    pub fn new(
        pool: ConnectionPool,
        redis_client: Arc<RedisClient>,
        app_config: &AppConfig,
    ) -> AppResult<Self> {
        let limits = DurationLimits::new(
            app_config.reservation.min_duration_minutes,
            app_config.reservation.max_duration_hours,
        );
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let reservation_repository =
            Arc::new(ReservationRepositoryImpl::new(pool.clone(), limits));
        let space_resolver: Arc<dyn SpaceResolver> = match app_config.spaces.mode {
            SpaceResolutionMode::Local => Arc::new(LocalSpaceResolverImpl::new(pool.clone())),
            SpaceResolutionMode::Remote => {
                Arc::new(RemoteSpaceResolverImpl::new(&app_config.spaces)?)
            }
        };
        let auth_repository = Arc::new(AuthRepositoryImpl::new(pool, redis_client));
        Ok(Self {
            health_check_repository,
            reservation_repository,
            space_resolver,
            auth_repository,
        })
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repository.clone()
    }

    pub fn space_resolver(&self) -> Arc<dyn SpaceResolver> {
        self.space_resolver.clone()
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }
}
