//! Step wizard: a linear state machine over the six form sections, plus a
//! terminal preview pseudo-state. Step jumps from the stepper UI are
//! ungated; leaving the preview returns to the last active step. Position
//! is not persisted across sessions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Personal,
    Education,
    Experience,
    Projects,
    SkillsLinks,
    Certifications,
}

impl WizardStep {
    pub const ORDER: [WizardStep; 6] = [
        WizardStep::Personal,
        WizardStep::Education,
        WizardStep::Experience,
        WizardStep::Projects,
        WizardStep::SkillsLinks,
        WizardStep::Certifications,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Personal => "Personal Info",
            WizardStep::Education => "Education",
            WizardStep::Experience => "Work Experience",
            WizardStep::Projects => "Projects",
            WizardStep::SkillsLinks => "Skills & Links",
            WizardStep::Certifications => "Certifications",
        }
    }

    fn index(&self) -> usize {
        Self::ORDER.iter().position(|s| s == self).unwrap_or(0)
    }
}

#[derive(Debug, Default)]
pub struct WizardController {
    current: usize,
    previewing: bool,
}

impl WizardController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last active step; meaningful even while previewing.
    pub fn current_step(&self) -> WizardStep {
        WizardStep::ORDER[self.current]
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    /// Advances one step; from the last step, opens the preview.
    pub fn next(&mut self) {
        if self.previewing {
            return;
        }
        if self.current + 1 < WizardStep::ORDER.len() {
            self.current += 1;
        } else {
            self.previewing = true;
        }
    }

    /// Retreats one step; no-op at step 0. While previewing, closes the
    /// preview and returns to the last active step.
    pub fn previous(&mut self) {
        if self.previewing {
            self.previewing = false;
        } else if self.current > 0 {
            self.current -= 1;
        }
    }

    /// Stepper jump, allowed unconditionally. Closes the preview if open.
    pub fn jump_to(&mut self, step: WizardStep) {
        self.previewing = false;
        self.current = step.index();
    }

    pub fn open_preview(&mut self) {
        self.previewing = true;
    }

    pub fn close_preview(&mut self) {
        self.previewing = false;
    }
}
