//! Pre-written campaigns served when no planning agent is reachable.
//!
//! Matching is keyword based: a catalog key contained in the goal wins,
//! then the fuzzy term table, then the generic entry.

use crate::models::{CampaignPlan, PlannedCampaign};

struct CatalogEntry {
    key: &'static str,
    hook: &'static str,
    offer: &'static str,
    cta: &'static str,
    captions: [&'static str; 3],
    image_url: &'static str,
}

const GENERIC: &str = "generic";

static ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        key: "hackathon",
        hook: "Code. Build. Disrupt. 💻 This isn't just another hackathon.",
        offer: "24-hour innovation marathon with industry mentors, ₹5L prize pool, and direct recruitment opportunities",
        cta: "Assemble your dream team. Registration ends in 48 hours!",
        captions: [
            "💻 Code. Build. Disrupt. Yeh sirf hackathon nahi hai - yeh tumhara launchpad hai! Squad ready karo - registration 48 hours mein close! #Hackathon #Coding",
            "🚀 Arre coders, yeh tumhara Kurukshetra hai! 24-hour hackathon mein apna best idea pitch karo. Team banao, register karo - clock ticking hai! ✨ #CodeFest",
            "⚡ Non-stop innovation incoming! Git commits at 3 AM aur debugging over samosas. Registration closing soon - don't sleep on this! #Hack #BharatBuilds",
        ],
        image_url: "https://images.unsplash.com/photo-1504384308090-c894fdcc538d?w=1024&h=1024&fit=crop",
    },
    CatalogEntry {
        key: "tech fest",
        hook: "Biggest tech fest of the year! 🎉",
        offer: "3 days of innovation, competitions, and prizes worth 10 lakhs",
        cta: "Register your team now - early bird discount live!",
        captions: [
            "🎉 Biggest tech fest of the year aa raha hai! 3 days of innovation aur 10 lakh ke prizes! Early bird discount live! 🔥 #TechFest",
            "✨ Tech enthusiasts, taiyar ho jao! Coding, robotics, AI sab kuch ek hi jagah. Registration open - jaldi karo! 💯 #TechEvent",
            "🚀 Innovation ka mahaul! Apni skills dikhao aur massive prizes jeeto. Early bird offer - register abhi! 💪 #TechFest",
        ],
        image_url: "https://images.unsplash.com/photo-1540575467063-178a50c2df87?w=1024&h=1024&fit=crop",
    },
    CatalogEntry {
        key: "python ai mastery",
        hook: "Code karna seekho, automation ka king bano! 🐍✨",
        offer: "2-day deep dive from basic syntax to building your first Neural Network. No prior experience needed.",
        cta: "Transform from beginner to AI builder. Registration closes in 72 hours!",
        captions: [
            "🐍 Zero se hero tak! Day 1: Variables se APIs tak. Day 2: Apna pehla Neural Network build karo! 🔥 #PythonAI",
            "✨ Yeh sirf workshop nahi - yeh transformation hai! Live coding, real datasets, practical AI projects. Register abhi! 💪 #LearnAI",
            "🤖 From 'Hello World' to 'Hello Neural Network' in 48 hours! Limited seats - apna spot secure karo! 🎯 #AIWorkshop",
        ],
        image_url: "https://images.unsplash.com/photo-1515879218367-8466d910aaa4?w=1024&h=1024&fit=crop",
    },
    CatalogEntry {
        key: "drone racing",
        hook: "Sky is not the limit anymore! 🚁",
        offer: "India's biggest Drone Racing Championship - prizes worth 5 lakhs",
        cta: "Register now and show your flying skills!",
        captions: [
            "🚁 Sky is not the limit anymore! Drone Racing Championship aa raha hai - prizes worth 5 lakhs! 🔥 #DroneRacing",
            "✈️ Arre pilots, ready ho? Compete karo aur 5 lakh jeet lo! Registration open - jaldi karo! 💯 #Drones",
            "🎯 Full throttle action incoming! Massive prizes aur ultimate glory! Register abhi! 🚀 #Racing",
        ],
        image_url: "https://images.unsplash.com/photo-1473968512647-3e447244af8f?w=1024&h=1024&fit=crop",
    },
    CatalogEntry {
        key: "cultural fest",
        hook: "Rang, music, aur dhamaal! 🎭",
        offer: "3-day cultural extravaganza with celebrity performances",
        cta: "Passes selling fast - book yours now!",
        captions: [
            "🎭 Rang, music, aur dhamaal! 3-day cultural extravaganza with celebrity performances! 🔥 #CulturalFest",
            "✨ Entertainment ka full dose! Dance, music, drama sab kuch. Passes book karo! 💯 #Fest",
            "🎉 College life ka best part! Unlimited masti, limited passes - jaldi book karo! 🚀 #CollegeFest",
        ],
        image_url: "https://images.unsplash.com/photo-1492684223066-81342ee5ff30?w=1024&h=1024&fit=crop",
    },
    CatalogEntry {
        key: GENERIC,
        hook: "Something amazing is coming! ✨",
        offer: "Be part of an incredible experience",
        cta: "Register now - don't miss out!",
        captions: [
            "✨ Something amazing is coming! Be part of an incredible experience. Register now aur don't miss out! 🔥 #Event",
            "🚀 Get ready for something special! Limited spots - register karo! 💯 #DontMiss",
            "🎉 Exciting times ahead! Registration open - jaldi karo! ✨ #JoinUs",
        ],
        image_url: "https://images.unsplash.com/photo-1540575467063-178a50c2df87?w=1024&h=1024&fit=crop",
    },
];

/// Term found in the goal -> catalog key. Order matters: first hit wins.
static FUZZY: &[(&str, &str)] = &[
    ("drone", "drone racing"),
    ("python", "python ai mastery"),
    ("neural", "python ai mastery"),
    ("automation", "python ai mastery"),
    ("coding", "python ai mastery"),
    ("code", "python ai mastery"),
    ("machine learning", "python ai mastery"),
    ("hack", "hackathon"),
    ("robot", "tech fest"),
    ("tech", "tech fest"),
    ("fest", "tech fest"),
    ("cultural", "cultural fest"),
    ("culture", "cultural fest"),
    ("dance", "cultural fest"),
    ("music", "cultural fest"),
];

/// Best catalog campaign for a free-text goal. Always returns something.
pub fn find_best_match(goal: &str) -> PlannedCampaign {
    let goal = goal.to_lowercase();
    let key = ENTRIES
        .iter()
        .map(|e| e.key)
        .find(|k| *k != GENERIC && goal.contains(k))
        .or_else(|| FUZZY.iter().find(|(term, _)| goal.contains(term)).map(|(_, key)| *key))
        .unwrap_or(GENERIC);
    entry(key).to_campaign()
}

fn entry(key: &str) -> &'static CatalogEntry {
    ENTRIES
        .iter()
        .find(|e| e.key == key)
        .unwrap_or(&ENTRIES[ENTRIES.len() - 1])
}

impl CatalogEntry {
    fn to_campaign(&self) -> PlannedCampaign {
        PlannedCampaign {
            plan: CampaignPlan { hook: self.hook.into(), offer: self.offer.into(), cta: self.cta.into() },
            captions: self.captions.iter().map(|c| c.to_string()).collect(),
            image_url: self.image_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_beats_fuzzy_terms() {
        let c = find_best_match("Python workshop at the Tech Fest");
        assert_eq!(c.plan.hook, "Biggest tech fest of the year! 🎉");
    }

    #[test]
    fn keyword_and_fuzzy_matches() {
        let c = find_best_match("Create a campaign for a Tech Club focusing on Hackathon");
        assert_eq!(c.plan.cta, "Assemble your dream team. Registration ends in 48 hours!");
        let c = find_best_match("drone show");
        assert!(c.plan.offer.contains("Drone Racing"));
    }

    #[test]
    fn unknown_goal_falls_back_to_generic() {
        let c = find_best_match("bakery discount week");
        assert_eq!(c.plan.hook, "Something amazing is coming! ✨");
        assert_eq!(c.captions.len(), 3);
        assert!(!c.image_url.is_empty());
    }

    #[test]
    fn generic_key_is_not_matched_directly() {
        let c = find_best_match("a generic tech meetup");
        assert_eq!(c.plan.hook, "Biggest tech fest of the year! 🎉");
    }
}
