//! What the user is asking the sticks about.
use std::fmt;

use bevy::prelude::Color;
#[cfg(feature = "debug")]
use bevy_inspector_egui::Inspectable;
use enum_map::Enum;

#[cfg_attr(feature = "debug", derive(Inspectable))]
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// 考研上岸
    Postgraduate,
    /// 省考上岸
    CivilService,
    /// 事业编上岸
    PublicInstitution,
}
impl Category {
    pub const ALL: [Category; 3] =
        [Category::Postgraduate, Category::CivilService, Category::PublicInstitution];

    pub fn title(self) -> &'static str {
        use Category::*;
        match self {
            Postgraduate => "考研上岸",
            CivilService => "省考上岸",
            PublicInstitution => "事业编上岸",
        }
    }
    pub fn blessing(self) -> &'static str {
        use Category::*;
        match self {
            Postgraduate => "金榜题名，一研为定",
            CivilService => "公考顺利，成功上岸",
            PublicInstitution => "编制在手，前程无忧",
        }
    }
    pub fn color(self) -> Color {
        use Category::*;
        match self {
            Postgraduate => Color::rgb(0.15, 0.39, 0.92),
            CivilService => Color::rgb(0.86, 0.15, 0.15),
            PublicInstitution => Color::rgb(0.02, 0.59, 0.41),
        }
    }
}
impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
