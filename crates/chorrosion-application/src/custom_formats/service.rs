// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::{Arc, Mutex};

use chorrosion_domain::{
    CustomFormatDeleted, CustomFormatDeletedPayload, CustomFormatId, CustomFormatSavedPayload,
    DomainEvent, Validate, ValidationError,
};
use moka::sync::Cache;
use thiserror::Error;
use tracing::{debug, info};

use super::format::CustomFormat;
use super::tag::TagParseError;
use crate::events::EventPublisher;
use crate::ports::{CustomFormatProvider, CustomFormatRepository};

const ALL_FORMATS_KEY: &str = "all";

#[derive(Debug, Error)]
pub enum CustomFormatError {
    #[error("invalid format tag: {0}")]
    Tag(#[from] TagParseError),

    #[error("custom format is invalid: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error("custom format {0} not found")]
    NotFound(CustomFormatId),

    #[error("custom format storage failed: {0}")]
    Repository(#[from] anyhow::Error),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type CustomFormatResult<T> = Result<T, CustomFormatError>;

/// Custom format access with a cache-aside view of all formats. Every write
/// clears the cache; the next read rebuilds it from the repository.
///
/// Writes bump `generation`. A rebuilt snapshot is only cached when no write
/// happened while it was being read, so a slow reader cannot put a list from
/// before the write back into the cache.
pub struct CustomFormatService<P: EventPublisher> {
    repository: Arc<dyn CustomFormatRepository>,
    publisher: P,
    cache: Cache<&'static str, Arc<Vec<CustomFormat>>>,
    generation: Mutex<u64>,
}

impl<P: EventPublisher> CustomFormatService<P> {
    pub fn new(repository: Arc<dyn CustomFormatRepository>, publisher: P) -> Self {
        Self {
            repository,
            publisher,
            cache: Cache::new(1),
            generation: Mutex::new(0),
        }
    }

    pub fn all(&self) -> CustomFormatResult<Arc<Vec<CustomFormat>>> {
        if let Some(cached) = self.cache.get(&ALL_FORMATS_KEY) {
            return Ok(cached);
        }

        let started_at = self.current_generation();
        let formats = Arc::new(self.repository.all()?);

        let generation = self.generation.lock().expect("format cache lock poisoned");
        if *generation == started_at {
            debug!(target: "custom_formats", count = formats.len(), "custom format cache rebuilt");
            self.cache.insert(ALL_FORMATS_KEY, formats.clone());
        } else {
            debug!(target: "custom_formats", "formats changed during read, not caching snapshot");
        }
        Ok(formats)
    }

    pub fn get(&self, id: CustomFormatId) -> CustomFormatResult<CustomFormat> {
        self.all()?
            .iter()
            .find(|format| format.id == id)
            .cloned()
            .ok_or(CustomFormatError::NotFound(id))
    }

    pub fn insert(&self, format: CustomFormat) -> CustomFormatResult<CustomFormat> {
        format.validate().map_err(CustomFormatError::Validation)?;
        self.repository.insert(&format)?;
        self.invalidate();

        info!(target: "custom_formats", format_id = %format.id, name = %format.name, "custom format created");
        self.publisher.publish(&DomainEvent::new(
            "custom_format.created",
            saved_payload(&format),
        ));
        Ok(format)
    }

    pub fn update(&self, format: CustomFormat) -> CustomFormatResult<CustomFormat> {
        format.validate().map_err(CustomFormatError::Validation)?;
        if self.repository.find(format.id)?.is_none() {
            return Err(CustomFormatError::NotFound(format.id));
        }
        self.repository.update(&format)?;
        self.invalidate();

        info!(target: "custom_formats", format_id = %format.id, name = %format.name, "custom format updated");
        self.publisher.publish(&DomainEvent::new(
            "custom_format.updated",
            saved_payload(&format),
        ));
        Ok(format)
    }

    pub fn delete(&self, id: CustomFormatId) -> CustomFormatResult<()> {
        if self.repository.find(id)?.is_none() {
            return Err(CustomFormatError::NotFound(id));
        }
        self.repository.delete(id)?;
        self.invalidate();

        info!(target: "custom_formats", format_id = %id, "custom format deleted");
        let event: CustomFormatDeleted =
            DomainEvent::new("custom_format.deleted", CustomFormatDeletedPayload { format_id: id });
        self.publisher.publish(&event);
        Ok(())
    }

    pub fn invalidate(&self) {
        let mut generation = self.generation.lock().expect("format cache lock poisoned");
        *generation = generation.wrapping_add(1);
        self.cache.invalidate_all();
    }

    fn current_generation(&self) -> u64 {
        *self.generation.lock().expect("format cache lock poisoned")
    }
}

impl<P: EventPublisher> CustomFormatProvider for CustomFormatService<P> {
    fn all_formats(&self) -> anyhow::Result<Arc<Vec<CustomFormat>>> {
        Ok(self.all()?)
    }
}

fn saved_payload(format: &CustomFormat) -> CustomFormatSavedPayload {
    CustomFormatSavedPayload {
        format_id: format.id,
        name: format.name.clone(),
        tag_count: format.tags.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::InMemoryEventBus;
    use anyhow::Result;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Barrier;

    #[derive(Default)]
    struct CountingRepository {
        formats: Mutex<Vec<CustomFormat>>,
        reads: AtomicUsize,
    }

    impl CustomFormatRepository for CountingRepository {
        fn all(&self) -> Result<Vec<CustomFormat>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.formats.lock().unwrap().clone())
        }

        fn find(&self, id: CustomFormatId) -> Result<Option<CustomFormat>> {
            Ok(self
                .formats
                .lock()
                .unwrap()
                .iter()
                .find(|f| f.id == id)
                .cloned())
        }

        fn insert(&self, format: &CustomFormat) -> Result<()> {
            self.formats.lock().unwrap().push(format.clone());
            Ok(())
        }

        fn update(&self, format: &CustomFormat) -> Result<()> {
            let mut formats = self.formats.lock().unwrap();
            if let Some(existing) = formats.iter_mut().find(|f| f.id == format.id) {
                *existing = format.clone();
            }
            Ok(())
        }

        fn delete(&self, id: CustomFormatId) -> Result<()> {
            self.formats.lock().unwrap().retain(|f| f.id != id);
            Ok(())
        }
    }

    fn service() -> (
        CustomFormatService<InMemoryEventBus>,
        Arc<CountingRepository>,
        InMemoryEventBus,
    ) {
        let repository = Arc::new(CountingRepository::default());
        let bus = InMemoryEventBus::new();
        let service = CustomFormatService::new(repository.clone(), bus.clone());
        (service, repository, bus)
    }

    /// Holds the first `all()` call between taking its snapshot and returning it.
    struct GatedRepository {
        inner: CountingRepository,
        snapshot_taken: Barrier,
        release: Barrier,
        gated: AtomicBool,
    }

    impl CustomFormatRepository for GatedRepository {
        fn all(&self) -> Result<Vec<CustomFormat>> {
            let snapshot = self.inner.all()?;
            if !self.gated.swap(true, Ordering::SeqCst) {
                self.snapshot_taken.wait();
                self.release.wait();
            }
            Ok(snapshot)
        }

        fn find(&self, id: CustomFormatId) -> Result<Option<CustomFormat>> {
            self.inner.find(id)
        }

        fn insert(&self, format: &CustomFormat) -> Result<()> {
            self.inner.insert(format)
        }

        fn update(&self, format: &CustomFormat) -> Result<()> {
            self.inner.update(format)
        }

        fn delete(&self, id: CustomFormatId) -> Result<()> {
            self.inner.delete(id)
        }
    }

    fn x264() -> CustomFormat {
        CustomFormat::from_raw(CustomFormatId::new(), "x264", &["C_R_(x|h)\\.?264"]).unwrap()
    }

    #[test]
    fn reads_are_served_from_cache() {
        let (service, repository, _) = service();
        service.insert(x264()).unwrap();

        assert_eq!(service.all().unwrap().len(), 1);
        assert_eq!(service.all().unwrap().len(), 1);
        assert_eq!(repository.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_write_invalidates_cache() {
        let (service, repository, _) = service();
        let format = service.insert(x264()).unwrap();
        service.all().unwrap();

        let mut renamed = format.clone();
        renamed.name = "AVC".into();
        service.update(renamed).unwrap();
        assert_eq!(service.get(format.id).unwrap().name, "AVC");
        assert_eq!(repository.reads.load(Ordering::SeqCst), 2);

        service.delete(format.id).unwrap();
        assert!(service.all().unwrap().is_empty());
        assert_eq!(repository.reads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn writes_publish_events() {
        let (service, _, bus) = service();
        let format = service.insert(x264()).unwrap();
        service.update(format.clone()).unwrap();
        service.delete(format.id).unwrap();

        assert_eq!(
            bus.names(),
            vec![
                "custom_format.created",
                "custom_format.updated",
                "custom_format.deleted"
            ]
        );
    }

    #[test]
    fn invalid_format_is_not_saved() {
        let (service, repository, bus) = service();
        let result = service.insert(CustomFormat::new("", vec![]));

        assert!(matches!(result, Err(CustomFormatError::Validation(_))));
        assert!(repository.formats.lock().unwrap().is_empty());
        assert!(bus.is_empty());
    }

    #[test]
    fn missing_format_is_reported() {
        let (service, _, _) = service();
        let id = CustomFormatId::new();
        assert!(matches!(service.get(id), Err(CustomFormatError::NotFound(_))));
        assert!(matches!(service.delete(id), Err(CustomFormatError::NotFound(_))));
    }

    #[test]
    fn snapshot_read_before_a_write_is_not_cached() {
        let repository = Arc::new(GatedRepository {
            inner: CountingRepository::default(),
            snapshot_taken: Barrier::new(2),
            release: Barrier::new(2),
            gated: AtomicBool::new(false),
        });
        let service = CustomFormatService::new(repository.clone(), InMemoryEventBus::new());

        std::thread::scope(|scope| {
            let reader = scope.spawn(|| service.all().unwrap().len());
            repository.snapshot_taken.wait();
            service.insert(x264()).unwrap();
            repository.release.wait();
            assert_eq!(reader.join().unwrap(), 0);
        });

        assert_eq!(service.all().unwrap().len(), 1);
        assert_eq!(repository.inner.formats.lock().unwrap().len(), 1);
    }
}
