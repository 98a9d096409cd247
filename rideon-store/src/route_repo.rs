use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use rideon_core::repository::RouteRepository;
use rideon_core::route::Route;

/// In-memory route store. Routes are written by administration and only
/// read by the booking core.
pub struct MemoryRouteRepository {
    routes: RwLock<HashMap<Uuid, Route>>,
}

impl MemoryRouteRepository {
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryRouteRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteRepository for MemoryRouteRepository {
    async fn insert(&self, route: Route) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.routes.write().await.insert(route.id, route);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Route>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.routes.read().await.get(&id).cloned())
    }
}
