#[derive(Debug, Clone, Copy)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl LimitOffset {
    /// Build from 1-based `page` / `limit` query params, clamping the
    /// limit to 1..=100 with a default page size of 20.
    pub fn from_page(page: Option<i64>, limit: Option<i64>) -> Self {
        let limit = limit.unwrap_or(20).clamp(1, 100);
        let page = page.unwrap_or(1).max(1);
        Self {
            limit,
            offset: (page - 1) * limit,
        }
    }
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let p = LimitOffset::from_page(None, None);
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn clamps_limit_and_page() {
        let p = LimitOffset::from_page(Some(0), Some(1000));
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset, 0);

        let p = LimitOffset::from_page(Some(3), Some(10));
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset, 20);
    }
}
