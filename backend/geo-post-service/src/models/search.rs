//! Search request parameters and their validated form.

use super::location::GeoPoint;
use crate::error::{AppError, Result};
use serde::Deserialize;

/// Page size used when `limit` is omitted.
pub const DEFAULT_LIMIT: u32 = 20;
/// Upper bound for `limit`.
pub const MAX_LIMIT: u32 = 100;

/// Raw query-string parameters, all optional and unparsed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Pagination as the caller sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Clamp raw values: page floors at 1, limit is held to [1, MAX_LIMIT].
    pub fn clamped(page: i64, limit: i64) -> Self {
        Self {
            page: page.clamp(1, u32::MAX as i64) as u32,
            limit: limit.clamp(1, MAX_LIMIT as i64) as u32,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    pub fn window(&self) -> Window {
        Window::new(self.limit, self.offset())
    }
}

/// A limit/offset pair handed to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u32,
    pub offset: u64,
}

impl Window {
    pub fn new(limit: u32, offset: u64) -> Self {
        Self {
            limit: limit.max(1),
            offset,
        }
    }

    /// Number of leading items needed to fill this window.
    pub fn end(&self) -> u64 {
        self.offset + self.limit as u64
    }

    /// Slice an already ordered result set; an offset past the end yields nothing.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(offset)
            .take(self.limit as usize)
            .collect()
    }
}

/// A radius query around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub radius_km: f64,
}

impl NearbyQuery {
    pub fn new(center: GeoPoint, radius_km: f64) -> Result<Self> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(AppError::invalid("radius must be greater than 0"));
        }
        Ok(Self { center, radius_km })
    }
}

/// Validated search criteria. Which retrieval path runs is decided by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub query: Option<String>,
    pub city: Option<String>,
    pub near: Option<NearbyQuery>,
    pub page: Page,
}

impl SearchCriteria {
    pub fn has_criterion(&self) -> bool {
        self.query.is_some() || self.city.is_some() || self.near.is_some()
    }
}

impl SearchParams {
    /// Validate everything the search endpoint accepts.
    pub fn into_criteria(self, default_radius_km: f64) -> Result<SearchCriteria> {
        let page = self.page()?;
        let near = self.nearby(default_radius_km)?;

        Ok(SearchCriteria {
            query: present(self.q),
            city: present(self.city),
            near,
            page,
        })
    }

    /// Validate a request that must carry a coordinate.
    pub fn into_nearby(self, default_radius_km: f64) -> Result<(NearbyQuery, Page)> {
        let page = self.page()?;
        let near = self
            .nearby(default_radius_km)?
            .ok_or_else(|| AppError::invalid("lat and lng are required"))?;
        Ok((near, page))
    }

    pub fn page(&self) -> Result<Page> {
        let page = parse_int("page", self.page.as_deref())?.unwrap_or(1);
        let limit = parse_int("limit", self.limit.as_deref())?.unwrap_or(DEFAULT_LIMIT as i64);
        Ok(Page::clamped(page, limit))
    }

    fn nearby(&self, default_radius_km: f64) -> Result<Option<NearbyQuery>> {
        let lat = parse_float("lat", self.lat.as_deref())?;
        let lng = parse_float("lng", self.lng.as_deref())?;
        let Some(center) = GeoPoint::from_pair(lat, lng)? else {
            return Ok(None);
        };

        let radius = parse_float("radius", self.radius.as_deref())?.unwrap_or(default_radius_km);
        NearbyQuery::new(center, radius).map(Some)
    }
}

fn present(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}

fn parse_float(name: &str, raw: Option<&str>) -> Result<Option<f64>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(AppError::invalid(format!(
            "{} must be a finite number, got '{}'",
            name, raw
        ))),
    }
}

fn parse_int(name: &str, raw: Option<&str>) -> Result<Option<i64>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::invalid(format!("{} must be an integer, got '{}'", name, raw)))
}
