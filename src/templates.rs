use crate::models::Template;

const fn t(id: &'static str, name: &'static str, boxes: usize) -> Template {
    Template { id, name, boxes }
}

/// Memegen templates the orchestrator shuffles through.
pub static MEMEGEN_TEMPLATES: &[Template] = &[
    t("drake", "Drake Hotline Bling", 2),
    t("distracted", "Distracted Boyfriend", 3),
    t("two-buttons", "Two Buttons", 2),
    t("cmm", "Change My Mind", 1),
    t("woman-cat", "Woman Yelling at Cat", 2),
    t("exit", "Left Exit 12", 3),
    t("brain", "Expanding Brain", 4),
    t("pigeon", "Is This A Pigeon", 2),
    t("buttons", "Daily Struggle", 2),
    t("waiting", "Waiting Skeleton", 1),
    t("success", "Success Kid", 2),
    t("ancient-aliens", "Ancient Aliens", 1),
    t("fine", "This Is Fine", 1),
    t("buzz", "X X Everywhere", 2),
    t("surprised-pikachu", "Surprised Pikachu", 1),
    t("first-time", "First Time?", 1),
    t("trade", "Trade Offer", 3),
    t("shut-up", "Shut Up And Take My Money", 1),
    t("scroll", "Scroll of Truth", 2),
    t("patrick", "Patrick Not My Wallet", 1),
    t("spiderman", "Spiderman Pointing", 2),
    t("kermit", "Kermit Tea", 1),
    t("batman", "Batman Slapping Robin", 2),
    t("harold", "Hide the Pain Harold", 2),
    t("doge", "Doge", 2),
    t("rollsafe", "Roll Safe", 1),
    t("morpheus", "What If I Told You", 2),
    t("wonka", "Condescending Wonka", 2),
    t("fry", "Futurama Fry", 2),
    t("picard", "Picard Facepalm", 2),
    t("awkward", "Awkward Moment Seal", 1),
    t("imagination", "Imagination Spongebob", 1),
    t("simply", "One Does Not Simply", 2),
    t("oficespace", "That Would Be Great", 2),
    t("oprah", "Oprah You Get A", 2),
    t("skeptical", "Third World Skeptical Kid", 2),
    t("ackbar", "Admiral Ackbar", 2),
    t("spongebob", "Mocking Spongebob", 2),
    t("yoda", "Baby Yoda", 2),
    t("disaster", "Disaster Girl", 1),
    t("bernie", "Bernie Sanders", 1),
    t("always", "Always Has Been", 2),
    t("tuxedo", "Tuxedo Winnie", 2),
    t("am-i-joke", "Am I A Joke To You", 1),
    t("bike", "Bike Fall", 2),
    t("clown", "Clown Applying Makeup", 4),
    t("handshake", "Epic Handshake", 3),
    t("oof", "Oof Size Large", 1),
    t("monkey", "Monkey Puppet", 1),
    t("lisa", "Lisa Simpson Presentation", 1),
    t("draw", "UNO Draw 25", 2),
    t("tenguy", "Ten Guy", 2),
    t("good-news", "Good News Everyone", 2),
    t("bad-time", "Youre Gonna Have A Bad Time", 2),
    t("milk", "Spilled Milk", 2),
];

/// Simple two-box template used by the first fallback tier.
pub const FALLBACK_TEMPLATE: Template = t("buzz", "Buzz Lightyear", 2);
