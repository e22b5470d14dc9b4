//! Recognized environment variables and the snapshot cache.
//!
//! Detection only ever looks at a closed list of variables ([`EnvVar`]). The
//! [`EnvCache`] reads all of them from an [`EnvSource`] once, stores the
//! values in an immutable [`Snapshot`], and serves every later lookup from it.
//!
//! An unset variable and a variable set to the empty string are the same
//! thing here: both read back as `""`.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

use strum::{EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::memo::Memo;

/// The environment variables that take part in color detection.
///
/// The string form of each variant is the exact variable name read from the
/// environment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, EnumString, IntoStaticStr,
)]
pub enum EnvVar {
    /// terminal type (e.g. `xterm-256color`)
    #[strum(serialize = "TERM")]
    Term,
    /// color support hint (e.g. `truecolor`, `24bit`)
    #[strum(serialize = "COLORTERM")]
    ColorTerm,
    /// disables color when set to anything non-empty (<https://no-color.org>)
    #[strum(serialize = "NO_COLOR")]
    NoColor,
    /// forces truecolor when set to anything non-empty
    #[strum(serialize = "FORCE_COLOR")]
    ForceColor,
    /// terminal program (e.g. `iTerm.app`, `Apple_Terminal`)
    #[strum(serialize = "TERM_PROGRAM")]
    TermProgram,
    #[strum(serialize = "TERM_PROGRAM_VERSION")]
    TermProgramVersion,
    /// Windows Terminal session id
    #[strum(serialize = "WT_SESSION")]
    WtSession,
    /// Windows Terminal profile id
    #[strum(serialize = "WT_PROFILE_ID")]
    WtProfileId,
    /// ANSI support in legacy Windows consoles
    #[strum(serialize = "ANSICON")]
    Ansicon,
    /// ConEmu's ANSI flag (`ON` when enabled)
    #[strum(serialize = "ConEmuANSI")]
    ConEmuAnsi,
    /// continuous integration
    #[strum(serialize = "CI")]
    Ci,
    /// remote SSH session
    #[strum(serialize = "SSH_CONNECTION")]
    SshConnection,
    /// present under WSL
    #[strum(serialize = "WSLENV")]
    WslEnv,
    /// Termux on Android
    #[strum(serialize = "TERMUX_VERSION")]
    TermuxVersion,
    #[strum(serialize = "COLOR_16")]
    Color16,
    #[strum(serialize = "COLOR_256")]
    Color256,
    #[strum(serialize = "COLOR_24")]
    Color24,
}

impl EnvVar {
    /// The variable name as it appears in the environment.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Looks up a recognized variable by its exact name.
    ///
    /// Names are case-sensitive: `"TERM"` is recognized, `"term"` is not.
    pub fn from_name(name: &str) -> Option<EnvVar> {
        EnvVar::from_str(name).ok()
    }
}

/// Somewhere to read environment variables from.
///
/// [`ProcessEnv`] reads the live process environment; a `HashMap` of names to
/// values works as an in-memory environment for tests and embedding.
pub trait EnvSource: Send + Sync {
    /// The value of `name`, or `None` when it is not set.
    fn var(&self, name: &str) -> Option<String>;
}

/// The live process environment.
///
/// Values that are not valid UTF-8 are converted lossily rather than
/// treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

impl<K, V> EnvSource for HashMap<K, V>
where
    K: Borrow<str> + Hash + Eq + Send + Sync,
    V: AsRef<str> + Send + Sync,
{
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.as_ref().to_string())
    }
}

/// The values of every [`EnvVar`] captured at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    values: [String; EnvVar::COUNT],
}

impl Snapshot {
    /// A snapshot in which every recognized variable is unset.
    pub fn empty() -> Self {
        Self {
            values: std::array::from_fn(|_| String::new()),
        }
    }

    /// Reads every recognized variable from `source`.
    pub fn capture(source: &dyn EnvSource) -> Self {
        let mut snapshot = Self::empty();
        for var in EnvVar::iter() {
            if let Some(value) = source.var(var.name()) {
                snapshot.values[var as usize] = value;
            }
        }
        snapshot
    }

    /// Returns a copy of the snapshot with `var` set to `value`.
    ///
    /// ## Examples
    ///
    /// ```
    /// use glint::{EnvVar, Snapshot};
    ///
    /// let snapshot = Snapshot::empty().with(EnvVar::Term, "xterm-256color");
    /// assert_eq!(snapshot.get(EnvVar::Term), "xterm-256color");
    /// assert_eq!(snapshot.get(EnvVar::ColorTerm), "");
    /// ```
    pub fn with(mut self, var: EnvVar, value: impl Into<String>) -> Self {
        self.values[var as usize] = value.into();
        self
    }

    /// The captured value of `var`; empty when it was unset.
    #[inline]
    pub fn get(&self, var: EnvVar) -> &str {
        &self.values[var as usize]
    }

    /// Whether `var` was set to a non-empty value.
    #[inline]
    pub fn is_set(&self, var: EnvVar) -> bool {
        !self.get(var).is_empty()
    }

    /// The recognized variables that carry a non-empty value.
    pub fn iter(&self) -> impl Iterator<Item = (EnvVar, &str)> {
        EnvVar::iter()
            .map(|var| (var, self.get(var)))
            .filter(|(_, value)| !value.is_empty())
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: Into<String>> FromIterator<(EnvVar, S)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (EnvVar, S)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Snapshot::empty(), |snapshot, (var, value)| snapshot.with(var, value))
    }
}

/// Caches the recognized environment variables after the first read.
///
/// Lookups are served from a shared [`Snapshot`]; the environment itself is
/// read at most once until [`EnvCache::invalidate`] is called. Changes made to
/// the environment after that first read are not observed.
pub struct EnvCache {
    source: Arc<dyn EnvSource>,
    snapshot: Memo<Arc<Snapshot>>,
}

impl EnvCache {
    /// A cache over the live process environment.
    pub fn new() -> Self {
        Self::with_source(ProcessEnv)
    }

    /// A cache over a custom environment source.
    pub fn with_source(source: impl EnvSource + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    pub(crate) fn from_shared(source: Arc<dyn EnvSource>) -> Self {
        Self {
            source,
            snapshot: Memo::new(),
        }
    }

    /// Populates the snapshot if it has not been populated yet.
    ///
    /// Concurrent callers wait for a single population; none of them see a
    /// partially filled snapshot.
    pub fn ensure_initialized(&self) {
        let _ = self.snapshot();
    }

    /// Whether the snapshot has been populated in the current window.
    pub fn is_initialized(&self) -> bool {
        self.snapshot.get().is_some()
    }

    /// A shared handle to the current snapshot, populating it if needed.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.get_or_init(|| {
            let snapshot = Snapshot::capture(self.source.as_ref());
            tracing::debug!(
                recognized = EnvVar::COUNT,
                set = snapshot.iter().count(),
                "Populated environment snapshot"
            );
            Arc::new(snapshot)
        })
    }

    /// The cached value of a recognized variable.
    pub fn var(&self, var: EnvVar) -> String {
        self.snapshot().get(var).to_string()
    }

    /// The cached value of the variable called `name`.
    ///
    /// Returns an empty string when the variable is unset or when `name` is
    /// not a recognized variable. Unrecognized names never cause the
    /// environment to be read.
    pub fn get(&self, name: &str) -> String {
        match EnvVar::from_name(name) {
            Some(var) => self.var(var),
            None => String::new(),
        }
    }

    /// Drops the snapshot so the next lookup reads the environment again.
    ///
    /// This is a maintenance operation for tests and reconfiguration. It is
    /// safe alongside concurrent readers, which see either the old snapshot or
    /// the fresh one.
    pub fn invalidate(&self) {
        self.snapshot.reset();
        tracing::debug!("Invalidated environment snapshot");
    }
}

impl Default for EnvCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvCache")
            .field("snapshot", &self.snapshot.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// An in-memory environment that counts how often it is read.
    struct CountingEnv {
        vars: Mutex<HashMap<String, String>>,
        reads: AtomicUsize,
    }

    impl CountingEnv {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                vars: Mutex::new(
                    pairs
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                reads: AtomicUsize::new(0),
            }
        }

        fn set(&self, key: &str, value: &str) {
            self.vars
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    impl EnvSource for Arc<CountingEnv> {
        fn var(&self, name: &str) -> Option<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.vars.lock().unwrap().get(name).cloned()
        }
    }

    #[test]
    fn names_match_environment_spelling() {
        assert_eq!(EnvVar::Term.name(), "TERM");
        assert_eq!(EnvVar::ColorTerm.name(), "COLORTERM");
        assert_eq!(EnvVar::NoColor.name(), "NO_COLOR");
        assert_eq!(EnvVar::ForceColor.name(), "FORCE_COLOR");
        assert_eq!(EnvVar::TermProgram.name(), "TERM_PROGRAM");
        assert_eq!(EnvVar::TermProgramVersion.name(), "TERM_PROGRAM_VERSION");
        assert_eq!(EnvVar::WtSession.name(), "WT_SESSION");
        assert_eq!(EnvVar::WtProfileId.name(), "WT_PROFILE_ID");
        assert_eq!(EnvVar::Ansicon.name(), "ANSICON");
        assert_eq!(EnvVar::ConEmuAnsi.name(), "ConEmuANSI");
        assert_eq!(EnvVar::Ci.name(), "CI");
        assert_eq!(EnvVar::SshConnection.name(), "SSH_CONNECTION");
        assert_eq!(EnvVar::WslEnv.name(), "WSLENV");
        assert_eq!(EnvVar::TermuxVersion.name(), "TERMUX_VERSION");
        assert_eq!(EnvVar::Color16.name(), "COLOR_16");
        assert_eq!(EnvVar::Color256.name(), "COLOR_256");
        assert_eq!(EnvVar::Color24.name(), "COLOR_24");
        assert_eq!(EnvVar::COUNT, 17);
    }

    #[test]
    fn from_name_is_case_sensitive() {
        assert_eq!(EnvVar::from_name("ConEmuANSI"), Some(EnvVar::ConEmuAnsi));
        assert_eq!(EnvVar::from_name("CONEMUANSI"), None);
        assert_eq!(EnvVar::from_name("term"), None);
        assert_eq!(EnvVar::from_name("HOME"), None);
    }

    #[test]
    fn capture_reads_only_recognized_names() {
        let source = HashMap::from([("TERM", "xterm"), ("HOME", "/home/me"), ("CI", "")]);
        let snapshot = Snapshot::capture(&source);

        assert_eq!(snapshot.get(EnvVar::Term), "xterm");
        assert_eq!(snapshot.get(EnvVar::Ci), "");
        assert!(!snapshot.is_set(EnvVar::Ci));
        assert_eq!(snapshot.iter().collect::<Vec<_>>(), vec![(EnvVar::Term, "xterm")]);
    }

    #[test]
    fn snapshot_from_iterator() {
        let snapshot: Snapshot = [(EnvVar::ColorTerm, "24bit"), (EnvVar::Ci, "true")]
            .into_iter()
            .collect();
        assert_eq!(snapshot.get(EnvVar::ColorTerm), "24bit");
        assert_eq!(snapshot.get(EnvVar::Ci), "true");
        assert_eq!(snapshot.get(EnvVar::Term), "");
    }

    #[test]
    fn cache_reads_environment_once() {
        let env = Arc::new(CountingEnv::new(&[("TERM", "screen")]));
        let cache = EnvCache::with_source(Arc::clone(&env));
        assert!(!cache.is_initialized());

        for _ in 0..10 {
            assert_eq!(cache.get("TERM"), "screen");
        }

        assert!(cache.is_initialized());
        assert_eq!(env.reads.load(Ordering::SeqCst), EnvVar::COUNT);
    }

    #[test]
    fn unrecognized_names_do_not_initialize() {
        let env = Arc::new(CountingEnv::new(&[("PATH", "/usr/bin")]));
        let cache = EnvCache::with_source(Arc::clone(&env));

        assert_eq!(cache.get("PATH"), "");
        assert_eq!(cache.get(""), "");
        assert!(!cache.is_initialized());
        assert_eq!(env.reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn later_environment_changes_are_not_observed_until_invalidate() {
        let env = Arc::new(CountingEnv::new(&[("COLORTERM", "256color")]));
        let cache = EnvCache::with_source(Arc::clone(&env));
        assert_eq!(cache.get("COLORTERM"), "256color");

        env.set("COLORTERM", "truecolor");
        assert_eq!(cache.get("COLORTERM"), "256color");

        cache.invalidate();
        assert!(!cache.is_initialized());
        assert_eq!(cache.get("COLORTERM"), "truecolor");
        assert_eq!(env.reads.load(Ordering::SeqCst), EnvVar::COUNT * 2);
    }

    #[test]
    fn concurrent_readers_populate_once() {
        let env = Arc::new(CountingEnv::new(&[("NO_COLOR", "1")]));
        let cache = Arc::new(EnvCache::with_source(Arc::clone(&env)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get("NO_COLOR"))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "1");
        }
        assert_eq!(env.reads.load(Ordering::SeqCst), EnvVar::COUNT);
    }
}

#[cfg(test)]
mod process_env_tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn process_env_reads_live_values() {
        let original = std::env::var_os("COLOR_256");
        // SAFETY: serialized by #[serial]; the previous value is restored below.
        unsafe { std::env::set_var("COLOR_256", "yes") };

        let cache = EnvCache::new();
        assert_eq!(cache.get("COLOR_256"), "yes");

        // SAFETY: same as above
        unsafe {
            match original {
                Some(value) => std::env::set_var("COLOR_256", value),
                None => std::env::remove_var("COLOR_256"),
            }
        }
    }
}
