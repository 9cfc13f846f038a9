use rand::seq::IndexedRandom;

/// Bundled list of API keys, shared by all users of a particular build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPool(Vec<String>);

impl KeyPool {
    /// Empty keys are dropped. Returns `None` if nothing is left.
    pub fn new(keys: impl IntoIterator<Item = impl Into<String>>) -> Option<Self> {
        let keys: Vec<String> = keys
            .into_iter()
            .map(Into::into)
            .filter(|key| !key.trim().is_empty())
            .collect();
        (!keys.is_empty()).then_some(Self(keys))
    }

    /// Pick one of the keys, uniformly at random.
    pub fn draw(&self) -> &str {
        // Pool is never empty, see `new`.
        self.0
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where the Static Maps API key comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CredentialSource {
    /// Key typed in the dialog, remembered between runs.
    #[default]
    UserEntered,

    /// Key drawn from a bundled pool for each run. Whatever was typed in the dialog is ignored.
    Pool(KeyPool),
}

impl CredentialSource {
    /// Resolve the key to use for a run.
    pub(crate) fn resolve(&self, entered: &str) -> String {
        match self {
            Self::UserEntered => entered.to_owned(),
            Self::Pool(pool) => pool.draw().to_owned(),
        }
    }

    /// Whether the dialog should ask for a key and the key should be persisted.
    pub fn is_user_entered(&self) -> bool {
        matches!(self, Self::UserEntered)
    }
}
