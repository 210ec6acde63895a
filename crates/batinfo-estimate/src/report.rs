//! Battery report model
//!
//! Builds the sectioned list the viewer shows, with every label and value
//! already localized. Values that cannot be determined render as `N/A`.

use batinfo_config::{DeviceSpec, Language, UserOverrides};
use batinfo_hal::{ChargeState, PowerSnapshot};
use serde::Serialize;
use std::fmt;

use crate::estimate::{self, CAPACITY_UNIT, RemainingTime};
use crate::input::OverrideField;

/// User-facing text for one language
#[derive(Debug)]
pub struct Strings {
    pub title: &'static str,
    pub not_available: &'static str,
    pub yes: &'static str,
    pub no: &'static str,

    pub section_battery: &'static str,
    pub section_health: &'static str,
    pub section_cycles: &'static str,
    pub section_device: &'static str,

    pub label_connection: &'static str,
    pub label_current_charge: &'static str,
    pub label_design_capacity: &'static str,
    pub label_remaining: &'static str,
    pub label_low_power: &'static str,
    pub label_actual_capacity: &'static str,
    pub label_health: &'static str,
    pub label_detailed_report: &'static str,
    pub label_model: &'static str,
    pub label_cpu: &'static str,
    pub label_frequency: &'static str,
    pub label_memory: &'static str,
    pub label_screen: &'static str,
    pub label_pixel_density: &'static str,
    pub label_resolution: &'static str,

    pub health_footer: &'static str,
    pub detailed_report_value: &'static str,
    pub capacity_prompt: &'static str,
    pub health_prompt: &'static str,

    pub state_unknown: &'static str,
    pub state_unplugged: &'static str,
    pub state_charging: &'static str,
    pub state_full: &'static str,

    pub capacity_dialog_title: &'static str,
    pub capacity_dialog_message: &'static str,
    pub capacity_placeholder: &'static str,
    pub health_dialog_title: &'static str,
    pub health_dialog_message: &'static str,
    pub health_placeholder: &'static str,

    pub error_title: &'static str,
    pub capacity_error: &'static str,
    pub health_error: &'static str,

    pub button_done: &'static str,
    pub button_cancel: &'static str,
    pub button_reenter: &'static str,

    pub hour_unit: &'static str,
    pub minute_unit: &'static str,
}

static EN: Strings = Strings {
    title: "Battery Info",
    not_available: "N/A",
    yes: "Yes",
    no: "No",

    section_battery: "Battery",
    section_health: "Battery Health",
    section_cycles: "Battery Cycles",
    section_device: "Device",

    label_connection: "Connection",
    label_current_charge: "Current charge",
    label_design_capacity: "Design capacity",
    label_remaining: "Estimated remaining",
    label_low_power: "Low power mode",
    label_actual_capacity: "Actual capacity",
    label_health: "Battery health",
    label_detailed_report: "Detailed report",
    label_model: "Model",
    label_cpu: "CPU",
    label_frequency: "Frequency",
    label_memory: "Memory",
    label_screen: "Screen size",
    label_pixel_density: "Pixel density",
    label_resolution: "Resolution",

    health_footer: "This is the battery capacity relative to when it was new. Lower capacity \
                    may result in shorter usage time between charges.",
    detailed_report_value: "Select to open",
    capacity_prompt: "Select to enter actual capacity",
    health_prompt: "Select to enter battery health",

    state_unknown: "Unknown",
    state_unplugged: "Discharging",
    state_charging: "Charging",
    state_full: "Fully charged",

    capacity_dialog_title: "Enter actual battery capacity",
    capacity_dialog_message: "If you have replaced the battery, enter its actual capacity \
                              below for a better estimate.",
    capacity_placeholder: "Actual capacity, e.g. ",
    health_dialog_title: "Enter battery health",
    health_dialog_message: "Check the maximum capacity in your system battery settings and \
                            enter it below for a better estimate.",
    health_placeholder: "Maximum capacity, e.g. 95",

    error_title: "Invalid input",
    capacity_error: "The value must be between 1 and 10000.",
    health_error: "The value must be between 1 and 100.",

    button_done: "OK",
    button_cancel: "Cancel",
    button_reenter: "Re-enter",

    hour_unit: "h",
    minute_unit: "m",
};

static ZH_CN: Strings = Strings {
    title: "电池信息",
    not_available: "N/A",
    yes: "是",
    no: "否",

    section_battery: "电池",
    section_health: "电池健康值",
    section_cycles: "电池周期",
    section_device: "设备",

    label_connection: "连接状态",
    label_current_charge: "当前电量",
    label_design_capacity: "设计容量",
    label_remaining: "预计可用",
    label_low_power: "低电量模式",
    label_actual_capacity: "电池实际电量",
    label_health: "电池健康值",
    label_detailed_report: "详细报告",
    label_model: "型号",
    label_cpu: "处理器",
    label_frequency: "主频",
    label_memory: "内存",
    label_screen: "屏幕尺寸",
    label_pixel_density: "像素密度",
    label_resolution: "分辨率",

    health_footer: "这是相对于新电池而言的电池容量,容量较低可能导致充电后,电池使用时间的缩短。",
    detailed_report_value: "点击操作",
    capacity_prompt: "点击输入实际电量",
    health_prompt: "点击输入健康值",

    state_unknown: "未知",
    state_unplugged: "放电中",
    state_charging: "充电中",
    state_full: "已充满",

    capacity_dialog_title: "输入电池实际容量",
    capacity_dialog_message: "如果您更换过电池,可以将电池实际容量输入到下方区域,以更好的评估电池。",
    capacity_placeholder: "实际容量, 如: ",
    health_dialog_title: "输入电池健康值",
    health_dialog_message: "前往 系统“设置-电池-电池健康”中查看电池最大容量，并在下方区域输入，以更好的评估电池。",
    health_placeholder: "最大容量,如: 95",

    error_title: "输入错误",
    capacity_error: "输入的值必须在1到10000之间。",
    health_error: "输入的值必须在1到100之间。",

    button_done: "确定",
    button_cancel: "取消",
    button_reenter: "重新输入",

    hour_unit: "小时",
    minute_unit: "分钟",
};

impl Strings {
    pub fn for_language(language: Language) -> &'static Strings {
        match language {
            Language::En => &EN,
            Language::ZhCn => &ZH_CN,
        }
    }

    pub fn charge_state(&self, state: ChargeState) -> &'static str {
        match state {
            ChargeState::Unknown => self.state_unknown,
            ChargeState::Unplugged => self.state_unplugged,
            ChargeState::Charging => self.state_charging,
            ChargeState::Full => self.state_full,
        }
    }

    pub fn yes_no(&self, value: bool) -> &'static str {
        if value { self.yes } else { self.no }
    }

    /// `60h 0m` / `60小时 0分钟`
    pub fn remaining(&self, time: RemainingTime) -> String {
        format!(
            "{}{} {}{}",
            time.hours, self.hour_unit, time.minutes, self.minute_unit
        )
    }

    pub fn dialog_title(&self, field: OverrideField) -> &'static str {
        match field {
            OverrideField::MeasuredCapacity => self.capacity_dialog_title,
            OverrideField::HealthPercent => self.health_dialog_title,
        }
    }

    pub fn dialog_message(&self, field: OverrideField) -> &'static str {
        match field {
            OverrideField::MeasuredCapacity => self.capacity_dialog_message,
            OverrideField::HealthPercent => self.health_dialog_message,
        }
    }

    /// Input hint; the capacity hint suggests the design capacity
    pub fn placeholder(&self, field: OverrideField, design_capacity: &str) -> String {
        match field {
            OverrideField::MeasuredCapacity => {
                format!("{}{}", self.capacity_placeholder, design_capacity)
            }
            OverrideField::HealthPercent => self.health_placeholder.to_string(),
        }
    }

    pub fn error_message(&self, field: OverrideField) -> &'static str {
        match field {
            OverrideField::MeasuredCapacity => self.capacity_error,
            OverrideField::HealthPercent => self.health_error,
        }
    }
}

/// What selecting a row does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    None,
    /// Opens the input dialog for an override
    Edit(OverrideField),
    /// Reserved entry with no behavior yet
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub label: String,
    pub value: String,
    pub action: RowAction,
}

impl Row {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            action: RowAction::None,
        }
    }

    fn with_action(mut self, action: RowAction) -> Self {
        self.action = action;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub rows: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

/// Everything the report is computed from
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    /// Resolved model identifier, if one could be obtained
    pub model: Option<&'a str>,
    /// Catalog record for the model
    pub spec: Option<&'a DeviceSpec>,
    pub snapshot: &'a PowerSnapshot,
    pub overrides: &'a UserOverrides,
    pub language: Language,
}

/// The full battery screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatteryReport {
    pub title: String,
    pub sections: Vec<Section>,
}

impl BatteryReport {
    pub fn build(inputs: &ReportInputs<'_>) -> Self {
        let strings = Strings::for_language(inputs.language);
        let na = strings.not_available;

        let nominal = inputs.spec.map(|s| s.battery_capacity.as_str());
        let design_capacity = nominal.unwrap_or(na);

        let (current_charge, remaining) = match inputs.snapshot.level {
            Some(fraction) => (
                estimate::format_current_charge(nominal, fraction, inputs.overrides),
                strings.remaining(estimate::estimate_remaining(fraction)),
            ),
            None => (na.to_string(), na.to_string()),
        };

        let battery = Section {
            title: strings.section_battery.to_string(),
            rows: vec![
                Row::new(
                    strings.label_connection,
                    strings.charge_state(inputs.snapshot.state),
                ),
                Row::new(strings.label_current_charge, current_charge),
                Row::new(strings.label_design_capacity, design_capacity),
                Row::new(strings.label_remaining, remaining),
                Row::new(
                    strings.label_low_power,
                    strings.yes_no(inputs.snapshot.low_power_mode),
                ),
            ],
            footer: None,
        };

        let actual = match estimate::actual_capacity(inputs.overrides) {
            Some(value) => format!("{}{}", value, CAPACITY_UNIT),
            None => strings.capacity_prompt.to_string(),
        };
        let health = match estimate::health_percent(inputs.overrides) {
            Some(value) => format!("{}%", value),
            None => strings.health_prompt.to_string(),
        };

        let battery_health = Section {
            title: strings.section_health.to_string(),
            rows: vec![
                Row::new(strings.label_actual_capacity, actual)
                    .with_action(RowAction::Edit(OverrideField::MeasuredCapacity)),
                Row::new(strings.label_health, health)
                    .with_action(RowAction::Edit(OverrideField::HealthPercent)),
            ],
            footer: Some(strings.health_footer.to_string()),
        };

        let cycles = Section {
            title: strings.section_cycles.to_string(),
            rows: vec![
                Row::new(strings.label_detailed_report, strings.detailed_report_value)
                    .with_action(RowAction::Placeholder),
            ],
            footer: None,
        };

        let field = |value: Option<&str>| value.unwrap_or(na).to_string();
        let spec = inputs.spec;
        let device = Section {
            title: strings.section_device.to_string(),
            rows: vec![
                Row::new(strings.label_model, field(inputs.model)),
                Row::new(strings.label_cpu, field(spec.map(|s| s.cpu.as_str()))),
                Row::new(
                    strings.label_frequency,
                    field(spec.map(|s| s.clock_frequency.as_str())),
                ),
                Row::new(
                    strings.label_memory,
                    field(spec.map(|s| s.memory.as_str())),
                ),
                Row::new(
                    strings.label_screen,
                    field(spec.map(|s| s.screen_size_inches.as_str())),
                ),
                Row::new(
                    strings.label_pixel_density,
                    field(spec.map(|s| s.pixel_density.as_str())),
                ),
                Row::new(
                    strings.label_resolution,
                    field(spec.map(|s| s.resolution.as_str())),
                ),
            ],
            footer: None,
        };

        Self {
            title: strings.title.to_string(),
            sections: vec![battery, battery_health, cycles, device],
        }
    }

    /// All rows in display order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.sections.iter().flat_map(|s| s.rows.iter())
    }

    /// Find a row by its label
    pub fn row(&self, label: &str) -> Option<&Row> {
        self.rows().find(|r| r.label == label)
    }
}

impl fmt::Display for BatteryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "[{}]", section.title)?;
            for row in &section.rows {
                writeln!(f, "  {}: {}", row.label, row.value)?;
            }
            if let Some(footer) = &section.footer {
                writeln!(f, "  {}", footer)?;
            }
        }

        Ok(())
    }
}
