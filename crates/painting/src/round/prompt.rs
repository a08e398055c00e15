//! Prompts and the collaborator that picks the next round

use blindsketch_config::Difficulty;
use serde::{Deserialize, Serialize};

/// The subject the player is asked to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub title: String,
    /// URL of the reference image revealed after drawing
    pub reference_image: Option<String>,
}

impl Prompt {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            reference_image: None,
        }
    }

    pub fn with_reference(mut self, url: impl Into<String>) -> Self {
        self.reference_image = Some(url.into());
        self
    }

    /// Used when no prompt source has anything to offer
    pub fn free_draw() -> Self {
        Self::new("free-draw", "Anything you like")
    }
}

/// Everything needed to start a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSetup {
    pub prompt: Prompt,
    pub difficulty: Difficulty,
}

impl RoundSetup {
    pub fn new(prompt: Prompt, difficulty: Difficulty) -> Self {
        Self { prompt, difficulty }
    }
}

/// Supplies the prompt and difficulty for each new round
pub trait PromptSource {
    fn next_round(&mut self) -> RoundSetup;
}

/// Cycles through a fixed list of prompts at one difficulty
#[derive(Debug, Clone)]
pub struct PromptDeck {
    prompts: Vec<Prompt>,
    next: usize,
    difficulty: Difficulty,
}

impl PromptDeck {
    pub fn new(prompts: Vec<Prompt>, difficulty: Difficulty) -> Self {
        Self {
            prompts,
            next: 0,
            difficulty,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl PromptSource for PromptDeck {
    fn next_round(&mut self) -> RoundSetup {
        let prompt = match self.prompts.get(self.next) {
            Some(prompt) => {
                self.next = (self.next + 1) % self.prompts.len();
                prompt.clone()
            }
            None => Prompt::free_draw(),
        };
        RoundSetup::new(prompt, self.difficulty)
    }
}
