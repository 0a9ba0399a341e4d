//! Weighted completion scores for profiles and checklists.

use crate::model::{DeploymentChecklist, ProviderProfile};
use serde::Serialize;

/// Minimum bio length (in characters) that earns the bio points.
pub const MIN_BIO_CHARS: usize = 50;

///
/// ChecklistItem
///

pub struct ChecklistItem<T> {
    pub key: &'static str,
    pub label: &'static str,
    pub weight: u32,
    check: fn(&T) -> bool,
}

impl<T> ChecklistItem<T> {
    #[must_use]
    pub fn is_done(&self, subject: &T) -> bool {
        (self.check)(subject)
    }
}

///
/// Checklist
///
/// Fixed list of weighted predicates. Each satisfied predicate contributes
/// its full weight; nothing is partial.
///

pub struct Checklist<T> {
    items: Vec<ChecklistItem<T>>,
}

impl<T> Checklist<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn item(
        mut self,
        key: &'static str,
        label: &'static str,
        weight: u32,
        check: fn(&T) -> bool,
    ) -> Self {
        self.items.push(ChecklistItem {
            key,
            label,
            weight,
            check,
        });
        self
    }

    #[must_use]
    pub fn items(&self) -> &[ChecklistItem<T>] {
        &self.items
    }

    #[must_use]
    pub fn max_points(&self) -> u32 {
        self.items.iter().map(|item| item.weight).sum()
    }

    #[must_use]
    pub fn evaluate(&self, subject: &T) -> CompletionScore {
        let mut points = 0;
        let mut missing = Vec::new();
        for item in &self.items {
            if item.is_done(subject) {
                points += item.weight;
            } else {
                missing.push(item.key);
            }
        }

        CompletionScore::new(points, self.max_points(), missing)
    }
}

impl<T> Default for Checklist<T> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// CompletionScore
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CompletionScore {
    pub points: u32,
    pub max: u32,

    /// `points` scaled to 0..=100, rounded to nearest.
    pub percent: u8,

    /// Keys of unsatisfied items, in checklist order.
    pub missing: Vec<&'static str>,
}

impl CompletionScore {
    fn new(points: u32, max: u32, missing: Vec<&'static str>) -> Self {
        let percent = if max == 0 {
            0
        } else {
            let scaled = (u64::from(points) * 100 + u64::from(max) / 2) / u64::from(max);
            u8::try_from(scaled.min(100)).unwrap_or(100)
        };

        Self {
            points,
            max,
            percent,
            missing,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.points >= self.max
    }
}

/// Provider profile completeness, as shown on the provider dashboard.
#[must_use]
pub fn provider_profile_checklist() -> Checklist<ProviderProfile> {
    Checklist::<ProviderProfile>::new()
        .item("photo", "Foto de perfil", 15, |p| {
            p.photo_url.as_deref().is_some_and(|url| !url.trim().is_empty())
        })
        .item("bio", "Biografia", 20, |p| {
            p.bio.trim().chars().count() >= MIN_BIO_CHARS
        })
        .item("phone", "Telefone", 10, |p| !p.phone.trim().is_empty())
        .item("city", "Cidade", 10, |p| !p.city.trim().is_empty())
        .item("services", "Serviços oferecidos", 20, |p| !p.services.is_empty())
        .item("portfolio", "Portfólio", 15, |p| !p.portfolio_urls.is_empty())
        .item("certifications", "Certificações", 10, |p| {
            !p.certifications.is_empty()
        })
}

/// Go-live readiness, as shown on the admin deployment page.
#[must_use]
pub fn deployment_checklist() -> Checklist<DeploymentChecklist> {
    Checklist::<DeploymentChecklist>::new()
        .item("domain", "Domínio configurado", 15, |c| c.domain_configured)
        .item("ssl", "SSL ativo", 15, |c| c.ssl_enabled)
        .item("env", "Variáveis de ambiente", 15, |c| c.env_vars_set)
        .item("database", "Banco migrado", 15, |c| c.database_migrated)
        .item("backups", "Backups", 10, |c| c.backups_enabled)
        .item("monitoring", "Monitoramento", 10, |c| c.monitoring_enabled)
        .item("payments", "Pagamentos testados", 10, |c| c.payments_tested)
        .item("legal", "Páginas legais", 10, |c| c.legal_pages_published)
}

///
/// TESTS
///
