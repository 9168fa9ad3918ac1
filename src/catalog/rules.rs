#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The built-in rule catalog.
//!
//! Five milestones: three required (code structure, timer pattern, button
//! polling with clean shutdown) and two variants for the alternative API
//! styles other sections of the course use (a threading/queue pipeline and
//! gpiozero callbacks). Variants are evaluated like every other milestone
//! but do not gate the exit code, since a single submission can only follow
//! one style at a time.
//!
//! Weights and wording are compiled in; nothing here is loaded from
//! untrusted input.

use anyhow::Result;

use super::{Milestone, Needs, PatternCatalog, Predicate, Rule};
use crate::queries::{BREAK_QUERY, EXCEPT_QUERY, FUNCTION_DEF_QUERY, TRY_QUERY};

/// Builds the full built-in catalog.
pub fn default_catalog() -> Result<PatternCatalog> {
    PatternCatalog::new(vec![
        code_structure(),
        timer_pattern(),
        button_polling(),
        threading_pipeline(),
        gpiozero_callbacks(),
    ])
}

/// Milestone 1: the script exists, parses, and has the expected skeleton.
fn code_structure() -> Milestone {
    Milestone::builder()
        .name("Code Structure")
        .slug("code_structure")
        .description("main.py exists, parses, and is organized into functions")
        .rules(vec![
            Rule::builder()
                .id("structure-script-exists")
                .description("main.py file present in the project root")
                .weight(5)
                .predicate(Predicate::FilePresent)
                .remediation(
                    "Create a file named main.py at the project root. This will be your \
                     main program with the timer and button polling code.",
                )
                .build(),
            Rule::builder()
                .id("structure-valid-syntax")
                .description("Python code that compiles without a syntax error")
                .weight(5)
                .predicate(Predicate::SyntaxValid)
                .remediation(
                    "Check the reported line for syntax errors. Run locally: \
                     python3 -m py_compile main.py",
                )
                .build(),
            Rule::builder()
                .id("structure-main-guard")
                .description("if __name__ == \"__main__\": guard")
                .weight(5)
                .predicate(Predicate::AllOf(vec![
                    Predicate::substring("__name__"),
                    Predicate::substring("__main__"),
                ]))
                .remediation(
                    "Add this pattern at the end of your script:\n\
                     \n\
                     \tdef main():\n\
                     \t    ...\n\
                     \n\
                     \tif __name__ == \"__main__\":\n\
                     \t    main()\n\
                     \n\
                     This allows your code to be imported as a module.",
                )
                .build(),
            Rule::builder()
                .id("structure-function-defs")
                .description("at least 2 function definitions")
                .weight(5)
                .needs(Needs::Ast)
                .predicate(Predicate::ast_count(FUNCTION_DEF_QUERY, "name", 2))
                .remediation(
                    "Organize your code with functions:\n\
                     \n\
                     \tdef read_sensor(sensor):\n\
                     \t    \"\"\"Read data from the sensor.\"\"\"\n\
                     \t    ...\n\
                     \n\
                     \tdef publish_data(client, data):\n\
                     \t    \"\"\"Publish data.\"\"\"\n\
                     \t    ...",
                )
                .build(),
            Rule::builder()
                .id("structure-config-constants")
                .description("configuration constants (UPPERCASE_NAMES) at module level")
                .weight(5)
                // Heuristic: a bare `INTERVAL`/`SENSOR`/`GPIO` token counts
                // as evidence. Permissive on purpose.
                .predicate(Predicate::AnyOf(vec![
                    Predicate::regex(r"(?m)^[A-Z][A-Z_0-9]+\s*="),
                    Predicate::substring("INTERVAL"),
                    Predicate::AllOf(vec![
                        Predicate::substring("SENSOR"),
                        Predicate::substring("="),
                    ]),
                    Predicate::AllOf(vec![
                        Predicate::substring("GPIO"),
                        Predicate::substring("="),
                    ]),
                ]))
                .remediation(
                    "Define constants at the top of your script:\n\
                     \n\
                     \tSENSOR_INTERVAL = 5    # seconds between readings\n\
                     \tBUTTON_PIN = 17        # GPIO pin for the button\n\
                     \n\
                     Constants make your code more readable and maintainable.",
                )
                .build(),
        ])
        .build()
}

/// Milestone 2: non-blocking timer-in-loop pattern, no threading yet.
fn timer_pattern() -> Milestone {
    Milestone::builder()
        .name("Timer Pattern")
        .slug("timer_pattern")
        .description("time.monotonic() timer-in-loop pattern, single main loop")
        .rules(vec![
            Rule::builder()
                .id("timer-time-import")
                .description("time module import")
                .weight(10)
                // The import query is authoritative when the file parses;
                // plain containment is the fallback.
                .predicate(Predicate::ast_preferred(
                    Predicate::ast_import("time"),
                    Predicate::any_substring(["import time", "from time import"]),
                ))
                .remediation(
                    "Add at the top of your script:\n\
                     \n\
                     \timport time\n\
                     \n\
                     The time module provides time.monotonic() for non-blocking timers \
                     and time.sleep() for short polling pauses.",
                )
                .build(),
            Rule::builder()
                .id("timer-monotonic-call")
                .description("time.monotonic() call for non-blocking timing")
                .weight(10)
                .predicate(Predicate::any_substring(["time.monotonic", "monotonic()"]))
                .remediation(
                    "Use time.monotonic() to measure elapsed time without blocking:\n\
                     \n\
                     \tprevious_time = time.monotonic()\n\
                     \twhile True:\n\
                     \t    current_time = time.monotonic()\n\
                     \t    if current_time - previous_time >= SENSOR_INTERVAL:\n\
                     \t        read_sensor()\n\
                     \t        previous_time = current_time\n\
                     \t    time.sleep(0.05)",
                )
                .build(),
            Rule::builder()
                .id("timer-interval-comparison")
                .description("timer-in-loop pattern: elapsed time compared against an interval")
                .weight(7)
                .predicate(Predicate::AllOf(vec![
                    Predicate::any_substring(["time.monotonic", "monotonic()"]),
                    Predicate::AnyOf(vec![
                        Predicate::regex(r"\w+\s*-\s*\w+\s*>=\s*\w+"),
                        Predicate::regex(r"\w+\s*-\s*\w+\s*>\s*\w+"),
                        Predicate::regex(r"(?i)INTERVAL\s*="),
                        Predicate::regex(r"(?i)elapsed\s*=\s*\w+\s*-\s*\w+"),
                    ]),
                ]))
                .remediation(
                    "Compare elapsed time against an interval:\n\
                     \n\
                     \tSENSOR_INTERVAL = 5  # seconds\n\
                     \tprevious = time.monotonic()\n\
                     \n\
                     \twhile True:\n\
                     \t    current = time.monotonic()\n\
                     \t    if current - previous >= SENSOR_INTERVAL:\n\
                     \t        read_sensor()\n\
                     \t        previous = current\n\
                     \t    time.sleep(0.05)",
                )
                .build(),
            Rule::builder()
                .id("timer-no-threading")
                .description("no threading or queue modules (single main loop)")
                .weight(8)
                // Inherently lexical: a banned module name appearing as a
                // literal token is what is being tested, parse or no parse.
                .predicate(Predicate::not(Predicate::any_substring([
                    "import threading",
                    "from threading import",
                    "import queue",
                    "from queue import",
                ])))
                .remediation(
                    "This assignment uses the timer-in-loop pattern with a single main \
                     loop; threading and queues are taught later in the course. Replace \
                     threads with direct calls:\n\
                     \n\
                     \twhile True:\n\
                     \t    if current - previous >= SENSOR_INTERVAL:\n\
                     \t        read_sensor(sensor)  # direct call\n\
                     \t        previous = current",
                )
                .build(),
        ])
        .build()
}

/// Milestone 3: digitalio button polling and clean shutdown.
fn button_polling() -> Milestone {
    Milestone::builder()
        .name("Button Polling & Clean Shutdown")
        .slug("button_polling")
        .description("digitalio polling, break-based shutdown, error handling")
        .rules(vec![
            Rule::builder()
                .id("polling-digitalio-import")
                .description("digitalio and board imports (and no gpiozero)")
                .weight(10)
                .predicate(Predicate::AllOf(vec![
                    Predicate::any_substring(["import digitalio", "from digitalio"]),
                    Predicate::any_substring(["import board", "from board"]),
                    Predicate::not(Predicate::substring("gpiozero")),
                ]))
                .remediation(
                    "Read the button by polling with digitalio, not gpiozero:\n\
                     \n\
                     \timport board\n\
                     \timport digitalio",
                )
                .build(),
            Rule::builder()
                .id("polling-button-read")
                .description("digitalio button configuration and button.value polling")
                .weight(10)
                .predicate(Predicate::AllOf(vec![
                    Predicate::not(Predicate::any_substring([
                        "when_pressed",
                        "when_released",
                        "when_held",
                    ])),
                    Predicate::AnyOf(vec![
                        Predicate::substring("button.value"),
                        Predicate::substring("DigitalInOut"),
                        Predicate::substring("Direction.INPUT"),
                        Predicate::substring("Pull.UP"),
                        Predicate::AllOf(vec![
                            Predicate::substring(".value"),
                            Predicate::substring("digitalio"),
                        ]),
                    ]),
                ]))
                .remediation(
                    "Configure the button and poll it in the main loop:\n\
                     \n\
                     \tbutton = digitalio.DigitalInOut(board.D17)\n\
                     \tbutton.direction = digitalio.Direction.INPUT\n\
                     \tbutton.pull = digitalio.Pull.UP\n\
                     \n\
                     \twhile True:\n\
                     \t    if not button.value:\n\
                     \t        print(\"Button pressed!\")\n\
                     \t    time.sleep(0.05)",
                )
                .build(),
            Rule::builder()
                .id("polling-break-shutdown")
                .description("break statement to leave the main loop")
                .weight(10)
                .predicate(Predicate::ast_preferred(
                    Predicate::ast_count(BREAK_QUERY, "break", 1),
                    Predicate::substring("break"),
                ))
                .remediation(
                    "Use break to stop the program when the button is held:\n\
                     \n\
                     \tif not button.value:\n\
                     \t    if press_start is None:\n\
                     \t        press_start = current_time\n\
                     \t    elif current_time - press_start >= 2:\n\
                     \t        print(\"Stop requested...\")\n\
                     \t        break\n\
                     \telse:\n\
                     \t    press_start = None",
                )
                .build(),
            Rule::builder()
                .id("polling-error-handling")
                .description("at least 2 try/except blocks around sensor and loop code")
                .weight(5)
                .predicate(Predicate::ast_preferred(
                    Predicate::AllOf(vec![
                        Predicate::ast_count(TRY_QUERY, "try", 2),
                        Predicate::ast_count(EXCEPT_QUERY, "except", 2),
                    ]),
                    Predicate::AllOf(vec![
                        Predicate::substring_count("try:", 2),
                        Predicate::substring_count("except", 2),
                    ]),
                ))
                .remediation(
                    "Code in the main loop can raise (I2C error, disconnected sensor, \
                     GPIO problem); without try/except a single error stops the whole \
                     program. Wrap the sensitive code:\n\
                     \n\
                     \tdef read_sensor(sensor):\n\
                     \t    try:\n\
                     \t        return sensor.temperature\n\
                     \t    except Exception as e:\n\
                     \t        print(f\"Read error: {e}\")",
                )
                .build(),
            Rule::builder()
                .id("polling-keyboard-interrupt")
                .description("KeyboardInterrupt handler for a clean Ctrl+C exit")
                .weight(5)
                .predicate(Predicate::substring("KeyboardInterrupt"))
                .remediation(
                    "Handle Ctrl+C gracefully:\n\
                     \n\
                     \ttry:\n\
                     \t    while True:\n\
                     \t        ...\n\
                     \t        time.sleep(0.05)\n\
                     \texcept KeyboardInterrupt:\n\
                     \t    print(\"Stop requested (Ctrl+C)...\")\n\
                     \tfinally:\n\
                     \t    button.deinit()\n\
                     \n\
                     The finally block always runs, even after Ctrl+C; use it to \
                     release GPIO resources.",
                )
                .build(),
        ])
        .build()
}

/// Variant milestone: the later-course producer/consumer pipeline built on
/// threading and queue. Mutually exclusive with the timer milestone's
/// no-threading rule; evaluated independently.
fn threading_pipeline() -> Milestone {
    Milestone::builder()
        .name("Threading Pipeline")
        .slug("threading_pipeline")
        .description("producer/consumer pattern with threading.Thread and queue.Queue")
        .required(false)
        .rules(vec![
            Rule::builder()
                .id("thread-threading-import")
                .description("threading module import")
                .weight(8)
                .predicate(Predicate::any_substring([
                    "import threading",
                    "from threading import",
                ]))
                .remediation("Add `import threading` at the top of your script.")
                .build(),
            Rule::builder()
                .id("thread-queue-import")
                .description("queue module import")
                .weight(8)
                .predicate(Predicate::any_substring([
                    "import queue",
                    "from queue import",
                ]))
                .remediation("Add `import queue` at the top of your script.")
                .build(),
            Rule::builder()
                .id("thread-queue-construction")
                .description("Queue() construction")
                .weight(6)
                .predicate(Predicate::substring("Queue("))
                .remediation(
                    "Create the shared queue once, before starting any thread:\n\
                     \n\
                     \tdata_queue = queue.Queue()",
                )
                .build(),
            Rule::builder()
                .id("thread-queue-put")
                .description(".put( call feeding the queue")
                .weight(5)
                .predicate(Predicate::substring(".put("))
                .remediation(
                    "The producer pushes readings onto the queue:\n\
                     \n\
                     \tdata_queue.put(reading)",
                )
                .build(),
            Rule::builder()
                .id("thread-thread-construction")
                .description("threading.Thread( construction")
                .weight(8)
                .predicate(Predicate::substring("threading.Thread("))
                .remediation(
                    "Create the worker thread with a target function:\n\
                     \n\
                     \tworker = threading.Thread(target=read_sensor, daemon=True)",
                )
                .build(),
            Rule::builder()
                .id("thread-thread-start")
                .description(".start() call launching the thread")
                .weight(5)
                .predicate(Predicate::substring(".start()"))
                .remediation("Start the thread after constructing it: `worker.start()`.")
                .build(),
        ])
        .build()
}

/// Variant milestone: the gpiozero callback style used by a different
/// section. A submission passing this one fails the digitalio polling
/// import rule by design.
fn gpiozero_callbacks() -> Milestone {
    Milestone::builder()
        .name("Gpiozero Callbacks")
        .slug("gpiozero_callbacks")
        .description("event-driven button handling with gpiozero callbacks")
        .required(false)
        .rules(vec![
            Rule::builder()
                .id("callback-gpiozero-import")
                .description("gpiozero module import")
                .weight(10)
                .predicate(Predicate::any_substring([
                    "import gpiozero",
                    "from gpiozero",
                ]))
                .remediation(
                    "Import the button class from gpiozero:\n\
                     \n\
                     \tfrom gpiozero import Button",
                )
                .build(),
            Rule::builder()
                .id("callback-when-pressed")
                .description("when_pressed callback assignment")
                .weight(10)
                .predicate(Predicate::substring("when_pressed"))
                .remediation(
                    "Register a handler on the button:\n\
                     \n\
                     \tbutton = Button(17)\n\
                     \tbutton.when_pressed = on_press",
                )
                .build(),
        ])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_constructs_with_unique_ids_and_positive_weights() {
        let catalog = default_catalog().expect("catalog");
        assert_eq!(catalog.milestones().len(), 5);
    }

    #[test]
    fn required_milestones_carry_the_published_point_totals() {
        let catalog = default_catalog().expect("catalog");
        let points: Vec<(String, u32, bool)> = catalog
            .milestones()
            .iter()
            .map(|m| (m.slug().to_string(), m.max_points(), m.required()))
            .collect();

        assert!(points.contains(&("code_structure".into(), 25, true)));
        assert!(points.contains(&("timer_pattern".into(), 35, true)));
        assert!(points.contains(&("button_polling".into(), 40, true)));
        assert!(points.contains(&("threading_pipeline".into(), 40, false)));
        assert!(points.contains(&("gpiozero_callbacks".into(), 20, false)));
        assert_eq!(catalog.required_max_points(), 100);
    }

    #[test]
    fn duplicate_rule_ids_are_rejected_at_construction() {
        let rule = || {
            Rule::builder()
                .id("dup")
                .description("d")
                .weight(1)
                .predicate(Predicate::substring("x"))
                .remediation("r")
                .build()
        };
        let milestone = Milestone::builder()
            .name("M")
            .slug("m")
            .description("d")
            .rules(vec![rule(), rule()])
            .build();
        assert!(PatternCatalog::new(vec![milestone]).is_err());
    }
}
