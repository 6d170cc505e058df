use crate::controls::{ActionState, PermissionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    TypeCards,
    SubscribeChoices,
    TargetChoices,
    Stats,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::TypeCards,
        Region::SubscribeChoices,
        Region::TargetChoices,
        Region::Stats,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Region::TypeCards => "typesContainer",
            Region::SubscribeChoices => "subscriptionTypesRadio",
            Region::TargetChoices => "targetTypesRadio",
            Region::Stats => "statsContainer",
        }
    }
}

pub trait Console {
    fn render(&mut self, region: Region, html: &str);

    fn show_permission(&mut self, permission: PermissionState);

    fn set_actions(&mut self, actions: ActionState);

    fn show_status(&mut self, message: &str);

    fn alert(&mut self, message: &str);

    fn confirm(&mut self, message: &str) -> bool;
}
