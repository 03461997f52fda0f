// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The ordered list of providers an address is resolved through.

use khora_core::error::ResolveResult;

use super::{
    DataProvider, DataQuery, EmbeddedProvider, FilesystemProvider, FilesystemSettings,
    LiveRecordProvider, Resolution,
};

/// Tries each provider in order; the first one with the data wins and later
/// providers are not consulted.
#[derive(Default)]
pub struct ProviderChain {
    providers: Vec<Box<dyn DataProvider>>,
}

impl ProviderChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain: embedded table, then live records, then the
    /// filesystem (unless disabled in `settings`).
    pub fn standard(settings: &FilesystemSettings) -> Self {
        let mut chain = Self::new()
            .with(EmbeddedProvider::new())
            .with(LiveRecordProvider::new());
        if settings.enabled {
            chain.push(FilesystemProvider::from(settings));
        }
        chain
    }

    /// Appends a provider at the lowest priority.
    pub fn push(&mut self, provider: impl DataProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, provider: impl DataProvider + 'static) -> Self {
        self.push(provider);
        self
    }

    /// Resolves `query` through the providers in order.
    ///
    /// # Errors
    /// Stops at and returns the first hard fault a provider reports.
    pub fn resolve(&self, query: &DataQuery<'_>) -> ResolveResult<Resolution> {
        for provider in &self.providers {
            log::trace!(
                "Trying {} ({}, cost {:.1}) for '{}'",
                provider.strategy_name(),
                provider.lane_kind(),
                provider.estimate_cost(),
                query.address
            );
            if let Some(bytes) = provider.provide(query)? {
                return Ok(Resolution::Found {
                    bytes,
                    provider: provider.strategy_name(),
                });
            }
        }
        Ok(Resolution::NotFound)
    }

    /// Finds the first provider of type `P`.
    pub fn provider<P: DataProvider + 'static>(&self) -> Option<&P> {
        self.providers
            .iter()
            .find_map(|provider| provider.as_any().downcast_ref::<P>())
    }

    /// Mutable counterpart of [`provider`](Self::provider).
    pub fn provider_mut<P: DataProvider + 'static>(&mut self) -> Option<&mut P> {
        self.providers
            .iter_mut()
            .find_map(|provider| provider.as_any_mut().downcast_mut::<P>())
    }

    /// Strategy names in priority order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .map(|provider| provider.strategy_name())
            .collect()
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns `true` if the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_chain_order() {
        let chain = ProviderChain::standard(&FilesystemSettings::default());
        assert_eq!(
            chain.strategy_names(),
            vec!["Embedded", "LiveRecord", "Filesystem"]
        );
    }

    #[test]
    fn standard_chain_tries_cheapest_sources_first() {
        let chain = ProviderChain::standard(&FilesystemSettings::default());
        let costs: Vec<f32> = chain
            .providers
            .iter()
            .map(|provider| provider.estimate_cost())
            .collect();
        assert!(costs.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn filesystem_can_be_disabled() {
        let settings = FilesystemSettings {
            enabled: false,
            root: None,
        };
        let chain = ProviderChain::standard(&settings);
        assert_eq!(chain.strategy_names(), vec!["Embedded", "LiveRecord"]);
        assert!(chain.provider::<FilesystemProvider>().is_none());
    }

    #[test]
    fn providers_can_be_located_by_type() {
        let mut chain = ProviderChain::standard(&FilesystemSettings::default());
        let embedded = chain
            .provider_mut::<EmbeddedProvider>()
            .expect("standard chain has an embedded table");
        embedded
            .insert(khora_core::Address::from_static("a"), b"a")
            .expect("insert");
        assert_eq!(chain.provider::<EmbeddedProvider>().map(|p| p.len()), Some(1));
    }
}
