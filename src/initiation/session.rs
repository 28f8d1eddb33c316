//! 🜂 Сессия мастера
//!
//! Ввод приходит сообщениями [`InputEvent`] по каналу. Сессия сворачивает
//! их в текущие выборы, архетип и точку квадранта и раз в кадр отдает
//! рендереру самый свежий целевой вектор. Серия событий между двумя
//! кадрами схлопывается в одну цель.

use crate::aura::mapper::{map_archetype_to_parameters, map_position_to_parameters, text_nudge};
use crate::aura::params::OrbParams;
use crate::demiurge::classifier::{classify_by_quiz, classify_by_sliders, SliderValues};
use crate::demiurge::persona::{
    choices_to_quadrant, describe, describe_trait, Personality, QuadrantPosition,
};
use crate::demiurge::{ArchetypeKey, OutputStance, StyleChoices};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tracing::{debug, info};
use uuid::Uuid;

/// Страницы мастера по порядку
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Intro,
    UserInfo,
    Quiz,
    Reveal,
    Seal,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Intro,
        WizardStep::UserInfo,
        WizardStep::Quiz,
        WizardStep::Reveal,
        WizardStep::Seal,
    ];

    fn index(&self) -> usize {
        match self {
            WizardStep::Intro => 0,
            WizardStep::UserInfo => 1,
            WizardStep::Quiz => 2,
            WizardStep::Reveal => 3,
            WizardStep::Seal => 4,
        }
    }
}

/// После стольких шагов сфера сформирована полностью
const STEPS_TO_CLARITY: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    QuizCompleted { answers: Vec<i32> },
    SlidersMoved { values: SliderValues },
    QuadrantDragged { position: QuadrantPosition },
    TraitSelected { personality: Personality },
    OutputChosen { output: OutputStance },
    StepCompleted { step: WizardStep },
    TextEntered { text: String },
    /// Вернувшийся пользователь сразу переходит к настройке с сохраненным набором.
    Resume {
        #[serde(default)]
        archetype: Option<ArchetypeKey>,
        #[serde(default)]
        choices: Option<StyleChoices>,
    },
}

/// Событие со временем срабатывания в секундах
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub at: f32,
    pub event: InputEvent,
}

/// Читает JSON-массив событий сценария, сортируя по времени.
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<ScriptedEvent>> {
    let content = std::fs::read_to_string(path)?;
    let mut script: Vec<ScriptedEvent> = serde_json::from_str(&content)?;
    script.sort_by(|a, b| a.at.total_cmp(&b.at));
    Ok(script)
}

/// Из чего сейчас формируется сфера
#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Quadrant(QuadrantPosition),
    Trait(Personality),
}

pub struct Session {
    id: Uuid,
    events: Receiver<InputEvent>,
    completed: [bool; 5],
    clarity: f32,
    choices: StyleChoices,
    archetype: Option<ArchetypeKey>,
    shape: Shape,
    text: Option<String>,
    target: OrbParams,
    dirty: bool,
}

impl Session {
    pub fn new(events: Receiver<InputEvent>) -> Self {
        let shape = Shape::Quadrant(QuadrantPosition::CENTER);
        let id = Uuid::new_v4();
        info!(session = %id, "session opened");
        Self {
            id,
            events,
            completed: [false; 5],
            clarity: 0.0,
            choices: StyleChoices::default(),
            archetype: None,
            shape,
            text: None,
            target: map_position_to_parameters(QuadrantPosition::CENTER, 0.0),
            dirty: false,
        }
    }

    /// Сессия и отправитель, в который хост пишет ввод.
    pub fn channel() -> (Sender<InputEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }

    /// Сворачивает все события из очереди. Возвращает новую цель, если
    /// что-то изменилось с прошлого вызова.
    pub fn drain(&mut self) -> Option<OrbParams> {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if self.dirty {
            self.dirty = false;
            Some(self.target)
        } else {
            None
        }
    }

    pub fn apply(&mut self, event: InputEvent) {
        debug!(session = %self.id, event = ?event, "input event");
        match event {
            InputEvent::QuizCompleted { answers } => {
                let key = classify_by_quiz(&answers);
                self.adopt_archetype(key);
                self.complete(WizardStep::Quiz);
                info!(session = %self.id, archetype = %key, "quiz classified");
            }
            InputEvent::SlidersMoved { values } => {
                self.choices = values.snap_choices(&self.choices);
                self.archetype = Some(classify_by_sliders(&values));
                self.shape = Shape::Quadrant(choices_to_quadrant(&self.choices));
            }
            InputEvent::QuadrantDragged { position } => {
                self.shape = Shape::Quadrant(position);
            }
            InputEvent::TraitSelected { personality } => {
                self.shape = Shape::Trait(personality);
            }
            InputEvent::OutputChosen { output } => {
                self.choices.output = Some(output);
                self.shape = Shape::Quadrant(choices_to_quadrant(&self.choices));
            }
            InputEvent::StepCompleted { step } => {
                self.complete(step);
            }
            InputEvent::TextEntered { text } => {
                self.text = if text.is_empty() { None } else { Some(text) };
            }
            InputEvent::Resume { archetype, choices } => {
                self.adopt_archetype(archetype.unwrap_or(ArchetypeKey::Oracle));
                if let Some(choices) = choices {
                    self.choices = choices;
                    self.shape = Shape::Quadrant(choices_to_quadrant(&choices));
                }
                for step in [WizardStep::Intro, WizardStep::UserInfo, WizardStep::Quiz] {
                    self.complete(step);
                }
            }
        }
        self.rebuild_target();
    }

    fn adopt_archetype(&mut self, key: ArchetypeKey) {
        self.archetype = Some(key);
        self.choices = key.archetype().default_choices;
        self.shape = Shape::Quadrant(choices_to_quadrant(&self.choices));
    }

    fn complete(&mut self, step: WizardStep) {
        self.completed[step.index()] = true;
        let done = self.completed.iter().filter(|c| **c).count() as f32;
        // clarity только растет
        self.clarity = self.clarity.max((done / STEPS_TO_CLARITY).min(1.0));
    }

    fn rebuild_target(&mut self) {
        let mut target = match self.shape {
            Shape::Quadrant(pos) => map_position_to_parameters(pos, self.clarity),
            Shape::Trait(personality) => map_archetype_to_parameters(&personality, self.clarity),
        };
        if let Some(text) = &self.text {
            let nudge = text_nudge(text, &target);
            target.apply(&nudge);
        }
        if target != self.target {
            self.target = target;
            self.dirty = true;
        }
    }

    pub fn clarity(&self) -> f32 {
        self.clarity
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed[step.index()]
    }

    pub fn choices(&self) -> &StyleChoices {
        &self.choices
    }

    pub fn archetype(&self) -> Option<ArchetypeKey> {
        self.archetype
    }

    /// Точка квадранта, из которой формируется сфера, если это не черта
    pub fn position(&self) -> Option<QuadrantPosition> {
        match self.shape {
            Shape::Quadrant(pos) => Some(pos),
            Shape::Trait(_) => None,
        }
    }

    pub fn target(&self) -> &OrbParams {
        &self.target
    }

    /// Подпись темперамента из двух слов для текущей формы
    pub fn describe(&self) -> String {
        match self.shape {
            Shape::Quadrant(pos) => describe(pos),
            Shape::Trait(personality) => describe_trait(personality.dominant),
        }
    }
}
