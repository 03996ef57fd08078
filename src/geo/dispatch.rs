// file: src/geo/dispatch.rs
// description: fire-and-forget per-ip geolocation tasks feeding the marker layer
// reference: tokio task spawning

use crate::geo::markers::{MarkerGeneration, MarkerLayer};
use crate::geo::resolver::GeoResolver;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct GeoDispatcher {
    resolver: Arc<dyn GeoResolver>,
    layer: Arc<MarkerLayer>,
}

impl GeoDispatcher {
    pub fn new(resolver: Arc<dyn GeoResolver>, layer: Arc<MarkerLayer>) -> Self {
        Self { resolver, layer }
    }

    pub fn layer(&self) -> &Arc<MarkerLayer> {
        &self.layer
    }

    /// Spawns one independent lookup per IP. Failures are logged and dropped;
    /// callers may ignore the handles.
    pub fn dispatch(&self, generation: MarkerGeneration, ips: Vec<String>) -> Vec<JoinHandle<()>> {
        debug!("Dispatching {} geolocation lookups", ips.len());

        ips.into_iter()
            .map(|ip| {
                let resolver = self.resolver.clone();
                let layer = self.layer.clone();

                tokio::spawn(async move {
                    match resolver.resolve(&ip).await {
                        Ok(point) => {
                            layer.add(generation, point.to_marker());
                        }
                        Err(e) => {
                            warn!("Failed to geolocate {}: {}", ip, e);
                        }
                    }
                })
            })
            .collect()
    }
}
