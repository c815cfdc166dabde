// frontend/src/telemetry_dashboard/mod.rs
//
// Per-session dashboard state: the device series, which tab is open, and how
// the table is paged and sorted. Everything the renderer needs is owned here;
// nothing lives in globals.

mod chart;
mod data_tab;
mod summary_tiles;

use devicemon_shared::{
    DeviceId, SeriesStore, SortDirection, TableColumn, TableSort, DEFAULT_TREND_LEN,
};
use std::fmt::Write;
use std::str::FromStr;

/// Page sizes the table can be switched between.
pub const PAGE_SIZE_OPTIONS: [usize; 3] = [25, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 100;

const HELP: &str = "commands: next | prev | <tab number> | <device id> | page next|prev|<n> \
                    | size 25|50|100 | sort <time|voltage|current|temp> [asc|desc] \
                    | trend <n> | help";

/// Operator input typed while the dashboard is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    NextTab,
    PrevTab,
    /// Zero-based tab index.
    SelectTab(usize),
    SelectDevice(DeviceId),
    NextPage,
    PrevPage,
    /// Zero-based table page.
    GoToPage(usize),
    PageSize(usize),
    Sort(TableSort),
    Trend(usize),
    Help,
}

impl FromStr for DashboardCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(head) = words.next() else {
            return Err("empty command".to_string());
        };
        let arg = words.next();

        let cmd = match head.to_ascii_lowercase().as_str() {
            "next" | "n" => DashboardCommand::NextTab,
            "prev" | "p" => DashboardCommand::PrevTab,
            "help" | "?" => DashboardCommand::Help,
            "page" => match arg.ok_or("page needs next, prev or a page number")? {
                "next" | "n" => DashboardCommand::NextPage,
                "prev" | "p" => DashboardCommand::PrevPage,
                n => match n.parse::<usize>() {
                    Ok(0) => return Err("pages are numbered from 1".to_string()),
                    Ok(page) => DashboardCommand::GoToPage(page - 1),
                    Err(_) => return Err(format!("bad page {n:?}")),
                },
            },
            "size" => {
                let n = arg.ok_or("size needs a page size")?;
                DashboardCommand::PageSize(n.parse().map_err(|_| format!("bad page size {n:?}"))?)
            }
            "trend" => {
                let n = arg.ok_or("trend needs a length")?;
                DashboardCommand::Trend(n.parse().map_err(|_| format!("bad trend length {n:?}"))?)
            }
            "sort" => {
                let column: TableColumn = arg.ok_or("sort needs a column")?.parse()?;
                let direction = match words.next().map(str::to_ascii_lowercase).as_deref() {
                    None | Some("desc") => SortDirection::Descending,
                    Some("asc") => SortDirection::Ascending,
                    Some(other) => return Err(format!("bad sort direction {other:?}")),
                };
                DashboardCommand::Sort(TableSort::new(column, direction))
            }
            _ => {
                if let Ok(tab) = head.parse::<usize>() {
                    if tab == 0 {
                        return Err("tabs are numbered from 1".to_string());
                    }
                    DashboardCommand::SelectTab(tab - 1)
                } else if let Ok(id) = head.parse::<DeviceId>() {
                    DashboardCommand::SelectDevice(id)
                } else {
                    return Err(format!("unknown command {head:?}"));
                }
            }
        };
        Ok(cmd)
    }
}

#[derive(Debug)]
pub struct Dashboard {
    store: SeriesStore,
    selected: usize,
    trend_len: usize,
    /// Zero-based table page of the selected device.
    page: usize,
    page_size: usize,
    sort: TableSort,
    notice: Option<String>,
}

impl Dashboard {
    pub fn new(devices: Vec<DeviceId>) -> Self {
        Self {
            store: SeriesStore::with_devices(devices),
            selected: 0,
            trend_len: DEFAULT_TREND_LEN,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: TableSort::default(),
            notice: None,
        }
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Feed one inbound frame. Returns whether a reading was stored.
    pub fn on_message(&mut self, raw: &str) -> bool {
        self.store.on_message(raw).is_some()
    }

    pub fn selected_device(&self) -> Option<&DeviceId> {
        self.store.devices().nth(self.selected)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Current table page, zero-based and clamped to the rows of the selected device.
    pub fn page(&self) -> usize {
        self.page.min(self.page_count() - 1)
    }

    fn page_count(&self) -> usize {
        let rows = self
            .selected_device()
            .and_then(|id| self.store.series(id))
            .map_or(0, |series| series.len());
        data_tab::page_count(rows, self.page_size)
    }

    /// Changing the size keeps the first visible row on screen.
    pub fn set_page_size(&mut self, size: usize) -> Result<(), String> {
        if !PAGE_SIZE_OPTIONS.contains(&size) {
            return Err(format!("page size must be one of {PAGE_SIZE_OPTIONS:?}"));
        }
        let first_row = self.page() * self.page_size;
        self.page_size = size;
        self.page = first_row / size;
        Ok(())
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<(), String> {
        let pages = self.page_count();
        if page >= pages {
            return Err(format!("there are only {pages} pages"));
        }
        self.page = page;
        Ok(())
    }

    pub fn set_trend_len(&mut self, len: usize) -> Result<(), String> {
        if len == 0 {
            return Err("trend length must be at least 1".to_string());
        }
        self.trend_len = len;
        Ok(())
    }

    pub fn select_device(&mut self, id: &DeviceId) -> Result<(), String> {
        let idx = self
            .store
            .devices()
            .position(|d| d == id)
            .ok_or_else(|| format!("no data for device {id} yet"))?;
        self.select_tab(idx);
        Ok(())
    }

    fn select_tab(&mut self, idx: usize) {
        if idx != self.selected {
            self.page = 0;
        }
        self.selected = idx;
    }

    pub fn apply(&mut self, cmd: DashboardCommand) -> Result<(), String> {
        let tabs = self.store.device_count();
        match cmd {
            DashboardCommand::NextTab if tabs > 0 => self.select_tab((self.selected + 1) % tabs),
            DashboardCommand::PrevTab if tabs > 0 => {
                self.select_tab((self.selected + tabs - 1) % tabs)
            }
            DashboardCommand::NextTab | DashboardCommand::PrevTab => {}
            DashboardCommand::SelectTab(idx) => {
                if idx >= tabs {
                    return Err(format!("there are only {tabs} tabs"));
                }
                self.select_tab(idx);
            }
            DashboardCommand::SelectDevice(id) => self.select_device(&id)?,
            DashboardCommand::NextPage => {
                self.page = (self.page() + 1).min(self.page_count() - 1)
            }
            DashboardCommand::PrevPage => self.page = self.page().saturating_sub(1),
            DashboardCommand::GoToPage(page) => self.go_to_page(page)?,
            DashboardCommand::PageSize(size) => self.set_page_size(size)?,
            DashboardCommand::Sort(sort) => {
                self.sort = sort;
                self.page = 0;
            }
            DashboardCommand::Trend(len) => self.set_trend_len(len)?,
            DashboardCommand::Help => {}
        }
        Ok(())
    }

    /// Handle one line of operator input; problems show up as a notice.
    pub fn handle_input(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.notice = match line.parse::<DashboardCommand>() {
            Ok(DashboardCommand::Help) => Some(HELP.to_string()),
            Ok(cmd) => self.apply(cmd).err(),
            Err(e) => Some(format!("{e} (type 'help')")),
        };
    }

    fn render_tabs(&self, out: &mut String) {
        for (i, id) in self.store.devices().enumerate() {
            if i == self.selected {
                let _ = write!(out, " [{id}] ");
            } else {
                let _ = write!(out, "  {id}  ");
            }
        }
        out.push('\n');
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Device Monitoring Dashboard\n");
        self.render_tabs(&mut out);
        out.push('\n');

        let Some(id) = self.selected_device() else {
            out.push_str("Waiting for devices...\n");
            return out;
        };

        let _ = writeln!(out, "Device {id} Real-time Data\n");
        out.push_str(&summary_tiles::render_tiles(&self.store.summary(id)));
        out.push('\n');
        out.push_str(&chart::render_trend(self.store.trend(id, self.trend_len)));
        out.push('\n');
        out.push_str(&data_tab::render_table(
            &self.store.table_sorted(id, self.sort),
            self.page(),
            self.page_size,
            self.sort,
        ));

        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "\n{notice}");
        }
        out
    }
}
