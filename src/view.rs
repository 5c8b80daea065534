use crate::filter::filter_leads;
use crate::models::{Lead, LeadQuery, PageItem, Pagination, ViewModeName};
use std::fmt;

pub const LATEST_COUNT: usize = 4;
pub const PAGE_SIZES: [usize; 3] = [10, 25, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;
const PAGE_WINDOW: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    FiltersDisabled,
    NotPaginated,
    PageOutOfRange { page: usize, total_pages: usize },
    UnsupportedPageSize(usize),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::FiltersDisabled => {
                f.write_str("search and filters are only available when viewing all leads")
            }
            ViewError::NotPaginated => f.write_str("the latest view is not paginated"),
            ViewError::PageOutOfRange { page, total_pages } => {
                write!(f, "page {page} is outside 1..={total_pages}")
            }
            ViewError::UnsupportedPageSize(size) => {
                write!(f, "page size must be one of 10, 25 or 50, got {size}")
            }
        }
    }
}

impl std::error::Error for ViewError {}

/// The query only exists while viewing all leads, so leaving `All` drops it.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    Latest,
    All { query: LeadQuery, page: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    mode: ViewMode,
    page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: ViewMode::Latest,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug)]
pub struct VisibleLeads<'a> {
    pub mode: ViewModeName,
    pub leads: Vec<(usize, &'a Lead)>,
    pub filtered_count: usize,
    pub pagination: Option<Pagination>,
}

impl ViewState {
    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn mode_name(&self) -> ViewModeName {
        match self.mode {
            ViewMode::Latest => ViewModeName::Latest,
            ViewMode::All { .. } => ViewModeName::All,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn query(&self) -> Option<&LeadQuery> {
        match &self.mode {
            ViewMode::Latest => None,
            ViewMode::All { query, .. } => Some(query),
        }
    }

    pub fn page(&self) -> usize {
        match self.mode {
            ViewMode::Latest => 1,
            ViewMode::All { page, .. } => page,
        }
    }

    pub fn toggle(&mut self) {
        self.mode = match self.mode {
            ViewMode::Latest => ViewMode::All {
                query: LeadQuery::default(),
                page: 1,
            },
            ViewMode::All { .. } => ViewMode::Latest,
        };
    }

    pub fn set_query(&mut self, new_query: LeadQuery) -> Result<(), ViewError> {
        match &mut self.mode {
            ViewMode::Latest => Err(ViewError::FiltersDisabled),
            ViewMode::All { query, page } => {
                *query = new_query;
                *page = 1;
                Ok(())
            }
        }
    }

    pub fn reset_filters(&mut self) -> Result<(), ViewError> {
        self.set_query(LeadQuery::default())
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<(), ViewError> {
        if !PAGE_SIZES.contains(&size) {
            return Err(ViewError::UnsupportedPageSize(size));
        }
        self.page_size = size;
        if let ViewMode::All { page, .. } = &mut self.mode {
            *page = 1;
        }
        Ok(())
    }

    pub fn go_to_page(&mut self, target: usize, leads: &[Lead]) -> Result<(), ViewError> {
        let page_size = self.page_size;
        match &mut self.mode {
            ViewMode::Latest => Err(ViewError::NotPaginated),
            ViewMode::All { query, page } => {
                let total_pages = total_pages(filter_leads(leads, query).len(), page_size);
                if target < 1 || target > total_pages {
                    return Err(ViewError::PageOutOfRange {
                        page: target,
                        total_pages,
                    });
                }
                *page = target;
                Ok(())
            }
        }
    }

    pub fn project<'a>(&self, leads: &'a [Lead]) -> VisibleLeads<'a> {
        match &self.mode {
            ViewMode::Latest => {
                let visible: Vec<(usize, &Lead)> =
                    leads.iter().enumerate().take(LATEST_COUNT).collect();
                VisibleLeads {
                    mode: ViewModeName::Latest,
                    filtered_count: visible.len(),
                    leads: visible,
                    pagination: None,
                }
            }
            ViewMode::All { query, page } => {
                let filtered: Vec<(usize, &Lead)> = leads
                    .iter()
                    .enumerate()
                    .filter(|(_, lead)| crate::filter::matches(lead, query))
                    .collect();
                let filtered_count = filtered.len();
                let start = (page - 1).saturating_mul(self.page_size);
                let visible = filtered
                    .into_iter()
                    .skip(start)
                    .take(self.page_size)
                    .collect();
                let pagination = (filtered_count > self.page_size)
                    .then(|| paginate(*page, self.page_size, filtered_count));

                VisibleLeads {
                    mode: ViewModeName::All,
                    leads: visible,
                    filtered_count,
                    pagination,
                }
            }
        }
    }
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

pub fn paginate(page: usize, page_size: usize, total_items: usize) -> Pagination {
    let total_pages = total_pages(total_items, page_size);
    Pagination {
        page,
        page_size,
        total_pages,
        total_items,
        start_item: (page - 1) * page_size + 1,
        end_item: (page * page_size).min(total_items),
        has_previous: page > 1,
        has_next: page < total_pages,
        items: page_items(page, total_pages),
    }
}

// First, last, current and its neighbours within two pages.
pub fn page_items(current: usize, total_pages: usize) -> Vec<PageItem> {
    let mut items = Vec::new();
    let mut previous: Option<usize> = None;
    for page in 1..=total_pages {
        let shown = page == 1 || page == total_pages || page.abs_diff(current) <= PAGE_WINDOW;
        if !shown {
            continue;
        }
        if previous.is_some_and(|prev| prev + 1 != page) {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(page));
        previous = Some(page);
    }
    items
}
