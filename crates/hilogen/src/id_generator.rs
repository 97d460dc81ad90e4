use core::{convert::Infallible, fmt};

use crate::{
    config::{HiLoConfig, Strategy},
    error::{ConfigError, Error},
    generator::{AtomicHiLoGenerator, HiLoGenerator, LockHiLoGenerator, StampedHiLoGenerator},
    layout::{Layout, Mode},
    source::HiSource,
};

enum Engine<S>
where
    S: HiSource,
{
    Lock(LockHiLoGenerator<S>),
    Optimistic(AtomicHiLoGenerator<S>),
    Stamped(StampedHiLoGenerator<S>),
}

/// A thread-safe Hi/Lo identifier generator whose concurrency strategy is
/// chosen at runtime.
///
/// This is the entry point for most users: it validates a [`HiLoConfig`],
/// builds the matching strategy ([`LockHiLoGenerator`],
/// [`AtomicHiLoGenerator`] or [`StampedHiLoGenerator`]) and forwards every
/// call to it. Use a strategy type directly when it is known at compile time.
///
/// With [`Mode::Pooled`], the source must be sparse with a sparseness of at
/// least `capacity - 1`, otherwise identifiers from different generators
/// sharing the same upstream sequence may collide. This cannot be checked
/// and is left to the caller.
///
/// # Example
/// ```
/// use hilogen::{IdGeneratorBuilder, InMemoryHiSource, Strategy};
///
/// let generator = IdGeneratorBuilder::new(10)
///     .strategy(Strategy::Stamped)
///     .build(InMemoryHiSource::default())
///     .unwrap();
///
/// let ids: Vec<i64> = (0..21).map(|_| generator.try_generate().unwrap()).collect();
/// assert_eq!(ids[10], 10);
/// assert_eq!(ids[20], 20);
/// ```
pub struct IdGenerator<S>
where
    S: HiSource,
{
    engine: Engine<S>,
    config: HiLoConfig,
}

impl<S> IdGenerator<S>
where
    S: HiSource,
{
    /// Validates `config` and creates a generator drawing hi values from
    /// `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] when `config.capacity <= 0`.
    pub fn new(config: HiLoConfig, source: S) -> Result<Self, ConfigError> {
        let layout = config.layout()?;
        let engine = match config.strategy {
            Strategy::Lock => Engine::Lock(LockHiLoGenerator::new(layout, source)),
            Strategy::Optimistic => Engine::Optimistic(
                AtomicHiLoGenerator::new(layout, source)
                    .with_max_optimistic_attempts(config.max_optimistic_attempts),
            ),
            Strategy::Stamped => Engine::Stamped(
                StampedHiLoGenerator::new(layout, source)
                    .with_max_optimistic_attempts(config.max_optimistic_attempts),
            ),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(%layout, strategy = %config.strategy, "created id generator");
        Ok(Self { engine, config })
    }

    /// Generates the next identifier.
    ///
    /// # Errors
    /// - [`Error::HiSource`] if a new hi value was needed and the source
    ///   failed
    /// - [`Error::LockPoisoned`] if another thread panicked inside the
    ///   exclusive section (`std` mutex only)
    pub fn try_generate(&self) -> Result<i64, Error<S::Err>> {
        match &self.engine {
            Engine::Lock(g) => g.try_generate(),
            Engine::Optimistic(g) => g.try_generate(),
            Engine::Stamped(g) => g.try_generate(),
        }
    }

    /// Generates the next identifier when no error is possible.
    ///
    /// See [`HiLoGenerator::generate`].
    pub fn generate(&self) -> i64
    where
        Error<S::Err>: Into<Infallible>,
    {
        HiLoGenerator::generate(self)
    }

    #[must_use]
    pub const fn config(&self) -> &HiLoConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        match &self.engine {
            Engine::Lock(g) => g.layout(),
            Engine::Optimistic(g) => g.layout(),
            Engine::Stamped(g) => g.layout(),
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.config.strategy
    }
}

impl<S> HiLoGenerator<S> for IdGenerator<S>
where
    S: HiSource,
{
    /// Creates an [`IdGenerator`] with the default strategy for `layout`.
    fn new(layout: Layout, source: S) -> Self {
        let engine = Engine::Optimistic(AtomicHiLoGenerator::new(layout, source));
        Self {
            engine,
            config: HiLoConfig::from(layout),
        }
    }

    fn layout(&self) -> Layout {
        self.layout()
    }

    fn try_generate(&self) -> Result<i64, Error<S::Err>> {
        self.try_generate()
    }
}

impl<S> fmt::Debug for IdGenerator<S>
where
    S: HiSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builds an [`IdGenerator`] step by step.
#[derive(Clone, Copy, Debug)]
#[must_use]
pub struct IdGeneratorBuilder {
    config: HiLoConfig,
}

impl IdGeneratorBuilder {
    /// Starts from the defaults of [`HiLoConfig::new`] with `capacity`
    /// identifiers per hi value.
    pub const fn new(capacity: i64) -> Self {
        Self {
            config: HiLoConfig::new(capacity),
        }
    }

    pub const fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub const fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub const fn max_optimistic_attempts(mut self, attempts: u32) -> Self {
        self.config.max_optimistic_attempts = attempts;
        self
    }

    /// Validates the configuration and creates the generator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] when the capacity is not
    /// positive.
    pub fn build<S>(self, source: S) -> Result<IdGenerator<S>, ConfigError>
    where
        S: HiSource,
    {
        IdGenerator::new(self.config, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryHiSource, generator::DEFAULT_MAX_OPTIMISTIC_ATTEMPTS};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::thread::scope;

    const STRATEGIES: [Strategy; 3] = [Strategy::Lock, Strategy::Optimistic, Strategy::Stamped];

    #[test]
    fn rejects_non_positive_capacity() {
        for capacity in [0, -1, i64::MIN] {
            let err = IdGenerator::new(HiLoConfig::new(capacity), InMemoryHiSource::default())
                .unwrap_err();
            assert_eq!(err, ConfigError::InvalidCapacity { capacity });
        }
        assert!(
            IdGeneratorBuilder::new(0)
                .build(InMemoryHiSource::default())
                .is_err()
        );
    }

    #[test]
    fn builder_carries_configuration() {
        let generator = IdGeneratorBuilder::new(5)
            .mode(Mode::Pooled)
            .strategy(Strategy::Lock)
            .max_optimistic_attempts(2)
            .build(InMemoryHiSource::default())
            .unwrap();

        assert_eq!(generator.strategy(), Strategy::Lock);
        assert_eq!(generator.layout(), Layout::pooled(5).unwrap());
        assert_eq!(generator.config().max_optimistic_attempts, 2);
    }

    #[test]
    fn every_strategy_rolls_over_at_capacity() {
        for strategy in STRATEGIES {
            let generator = IdGeneratorBuilder::new(10)
                .strategy(strategy)
                .build(InMemoryHiSource::default())
                .unwrap();
            let ids: Vec<i64> = (0..21).map(|_| generator.try_generate().unwrap()).collect();
            assert_eq!(ids, (0..21).collect::<Vec<_>>(), "{strategy}");
        }
    }

    #[test]
    fn every_strategy_pooled_is_contiguous() {
        for strategy in STRATEGIES {
            let generator = IdGeneratorBuilder::new(5)
                .mode(Mode::Pooled)
                .strategy(strategy)
                .build(InMemoryHiSource::with_sparseness(0, 4).unwrap())
                .unwrap();
            let ids: Vec<i64> = (0..12).map(|_| generator.try_generate().unwrap()).collect();
            assert_eq!(ids, (0..12).collect::<Vec<_>>(), "{strategy}");
        }
    }

    #[test]
    fn every_strategy_is_unique_across_threads() {
        const THREADS: usize = 8;
        const IDS_PER_THREAD: usize = 4000;

        for strategy in STRATEGIES {
            let generator = IdGeneratorBuilder::new(1)
                .strategy(strategy)
                .build(InMemoryHiSource::default())
                .unwrap();
            let seen_ids = Mutex::new(HashSet::new());

            scope(|s| {
                for _ in 0..THREADS {
                    s.spawn(|| {
                        for _ in 0..IDS_PER_THREAD {
                            let id = generator.try_generate().unwrap();
                            assert!(seen_ids.lock().unwrap().insert(id));
                        }
                    });
                }
            });

            let seen_ids = seen_ids.into_inner().unwrap();
            let expected: HashSet<i64> = (0..(THREADS * IDS_PER_THREAD) as i64).collect();
            assert_eq!(seen_ids, expected, "{strategy}");
        }
    }

    #[test]
    fn trait_constructor_uses_default_strategy() {
        let generator: IdGenerator<_> =
            HiLoGenerator::new(Layout::hilo(3).unwrap(), InMemoryHiSource::default());
        assert_eq!(generator.strategy(), Strategy::Optimistic);
        assert_eq!(
            generator.config().max_optimistic_attempts,
            DEFAULT_MAX_OPTIMISTIC_ATTEMPTS
        );
        assert_eq!(generator.try_generate().unwrap(), 0);
    }

    #[test]
    fn debug_shows_configuration_only() {
        let generator = IdGeneratorBuilder::new(7)
            .build(InMemoryHiSource::new(123_456).unwrap())
            .unwrap();
        let debug = format!("{generator:?}");
        assert!(debug.starts_with("IdGenerator { config: HiLoConfig { capacity: 7"));
        assert!(!debug.contains("123456"));
    }
}
