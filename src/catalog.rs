use serde::{Deserialize, Serialize};
use std::fmt;

/// Achievement badges. The set is closed; awarding is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeId {
    #[serde(rename = "journal_start")]
    JournalStart,
    #[serde(rename = "streak_3")]
    Streak3,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "level_5")]
    Level5,
    #[serde(rename = "goal_master")]
    GoalMaster,
    #[serde(rename = "challenge_hero")]
    ChallengeHero,
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BadgeId::JournalStart => "journal_start",
            BadgeId::Streak3 => "streak_3",
            BadgeId::Streak7 => "streak_7",
            BadgeId::Level5 => "level_5",
            BadgeId::GoalMaster => "goal_master",
            BadgeId::ChallengeHero => "challenge_hero",
        };
        write!(f, "{}", name)
    }
}

/// Badge definition consumed read-only by the store and the CLI.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Badge {
    pub id: BadgeId,
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

const BADGES: [Badge; 6] = [
    Badge {
        id: BadgeId::JournalStart,
        title: "Primeiro Registro",
        icon: "📔",
        description: "Escreveu a primeira entrada no diário",
    },
    Badge {
        id: BadgeId::Streak3,
        title: "Três Dias Seguidos",
        icon: "🔥",
        description: "Fez check-in por 3 dias consecutivos",
    },
    Badge {
        id: BadgeId::Streak7,
        title: "Uma Semana Inteira",
        icon: "⚡",
        description: "Fez check-in por 7 dias consecutivos",
    },
    Badge {
        id: BadgeId::Level5,
        title: "Nível 5",
        icon: "⭐",
        description: "Alcançou o nível 5",
    },
    Badge {
        id: BadgeId::GoalMaster,
        title: "Mestre das Metas",
        icon: "🎯",
        description: "Concluiu 5 metas",
    },
    Badge {
        id: BadgeId::ChallengeHero,
        title: "Herói dos Desafios",
        icon: "🏆",
        description: "Completou todos os desafios",
    },
];

pub fn badge(id: BadgeId) -> &'static Badge {
    let idx = match id {
        BadgeId::JournalStart => 0,
        BadgeId::Streak3 => 1,
        BadgeId::Streak7 => 2,
        BadgeId::Level5 => 3,
        BadgeId::GoalMaster => 4,
        BadgeId::ChallengeHero => 5,
    };
    &BADGES[idx]
}

pub fn all_badges() -> &'static [Badge] {
    &BADGES
}

/// A catalog-defined one-time-completable task granting fixed XP.
///
/// Challenge ids are open strings so that an unknown id is representable
/// and rejected against the catalog at completion time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub xp: u32,
}

const CHALLENGES: [Challenge; 5] = [
    Challenge {
        id: "agua",
        title: "Hidratação em dia",
        description: "Beba 2 litros de água hoje",
        xp: 20,
    },
    Challenge {
        id: "caminhada",
        title: "Caminhada leve",
        description: "Caminhe por 30 minutos",
        xp: 30,
    },
    Challenge {
        id: "gratidao",
        title: "Diário de gratidão",
        description: "Anote 3 coisas pelas quais você é grato",
        xp: 25,
    },
    Challenge {
        id: "meditacao",
        title: "Momento de calma",
        description: "Medite por 10 minutos",
        xp: 40,
    },
    Challenge {
        id: "sono",
        title: "Noite bem dormida",
        description: "Durma pelo menos 8 horas",
        xp: 35,
    },
];

pub fn challenges() -> &'static [Challenge] {
    &CHALLENGES
}

pub fn find_challenge(id: &str) -> Option<&'static Challenge> {
    CHALLENGES.iter().find(|c| c.id == id)
}
