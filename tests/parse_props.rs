use gsrf::lexer::Lexer;
use gsrf::{format, from_ssa, from_trace, parse, to_ssa, to_trace, Metadata, Receiver, Symbol};
use proptest::prelude::*;

// =============================================================================
// Generators for parser-constructible symbols
// =============================================================================

fn ident() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,8}".prop_filter("init is classified separately", |s| s != "init")
}

fn package_path() -> impl Strategy<Value = String> {
    "[a-z]{1,6}(\\.[a-z]{2,3})?(/[a-z][a-z0-9_]{0,6}){0,3}"
}

fn type_expr() -> impl Strategy<Value = String> {
    prop_oneof![
        ident(),
        Just("int".to_string()),
        Just("[]byte".to_string()),
        Just("*bytes.Buffer".to_string()),
        Just("map[string]int".to_string()),
        Just("Map[K, V]".to_string()),
        Just("func(int, string) error".to_string()),
        Just("List[Pair[A, B]]".to_string()),
    ]
}

fn type_args() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(type_expr(), 0..4)
}

fn receiver() -> impl Strategy<Value = Option<Receiver>> {
    prop::option::of((ident(), any::<bool>(), type_args()).prop_map(|(name, ptr, args)| {
        Receiver::new(name, ptr).with_type_args(args)
    }))
}

fn metadata() -> impl Strategy<Value = Metadata> {
    let value = "[A-Za-z0-9_/]{1,8}";
    (
        prop::option::of(value),
        prop::option::of(value),
        prop::option::of("[a-z]{1,6}\\.go:[1-9][0-9]{0,3}:[1-9][0-9]?"),
        prop::collection::btree_map("x[a-z]{0,5}", value, 0..3),
    )
        .prop_map(|(via, alias, position, custom)| Metadata {
            via: via.unwrap_or_default(),
            alias: alias.unwrap_or_default(),
            position: position.unwrap_or_default(),
            custom,
        })
}

fn symbol() -> impl Strategy<Value = Symbol> {
    let init = (package_path(), prop::option::of(ident()), metadata()).prop_map(
        |(pkg, ctx, metadata)| Symbol {
            context: ctx,
            metadata,
            ..Symbol::init(pkg)
        },
    );

    let callable = (
        package_path(),
        receiver(),
        ident(),
        type_args(),
        prop::option::of(0u32..50),
        prop::option::of(ident()),
        metadata(),
    )
        .prop_map(|(pkg, receiver, name, args, anon, ctx, metadata)| {
            let mut sym = Symbol {
                package_path: pkg,
                name,
                receiver,
                type_args: args,
                context: ctx,
                metadata,
                ..Symbol::default()
            };
            if let Some(index) = anon {
                sym.is_anonymous = true;
                sym.anon_index = index;
                sym.anon_parent = sym.enclosing_name();
            }
            sym
        });

    prop_oneof![1 => init, 6 => callable]
}

// =============================================================================
// Generators for foreign notations
// =============================================================================

fn foreign_args() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(
            prop_oneof![ident(), Just("int".to_string()), Just("...".to_string())],
            1..3,
        ),
        prop_oneof![Just(","), Just(", ")],
    )
        .prop_map(|(args, sep)| format!("[{}]", args.join(sep)))
}

fn receiver_text(pointer: impl Strategy<Value = bool>) -> impl Strategy<Value = String> {
    (pointer, ident(), prop::option::of(foreign_args())).prop_map(|(ptr, name, args)| {
        format!("({}{name}{})", if ptr { "*" } else { "" }, args.unwrap_or_default())
    })
}

fn trace_frame() -> impl Strategy<Value = String> {
    let init = (package_path(), prop::option::of(1u32..20))
        .prop_map(|(pkg, n)| match n {
            Some(n) => format!("{pkg}.init.func{n}"),
            None => format!("{pkg}.init"),
        });

    let head = prop_oneof![
        (package_path(), ident()).prop_map(|(pkg, name)| format!("{pkg}.{name}")),
        (package_path(), ident(), foreign_args())
            .prop_map(|(pkg, name, args)| format!("{pkg}.{name}{args}")),
        (package_path(), receiver_text(Just(true)), ident())
            .prop_map(|(pkg, recv, name)| format!("{pkg}.{recv}.{name}")),
    ];
    let closures = prop::collection::vec((any::<bool>(), 1u32..1000), 0..4);
    let callable = (head, closures).prop_map(|(mut frame, closures)| {
        for (i, (numeral, n)) in closures.into_iter().enumerate() {
            if i > 0 && numeral {
                frame.push_str(&format!(".{n}"));
            } else {
                frame.push_str(&format!(".func{n}"));
            }
        }
        frame
    });

    let tail = prop_oneof![
        Just(""),
        Just("()"),
        Just("(0xc000012345, 0x1)"),
        Just(" /home/u/src/main.go:12 +0x1d"),
        Just("(0x1) /home/u/src/main.go:7 +0x5c"),
    ];
    (prop_oneof![1 => init, 5 => callable], tail).prop_map(|(frame, tail)| frame + tail)
}

fn ssa_name() -> impl Strategy<Value = String> {
    let init = (package_path(), 1u32..20).prop_map(|(pkg, n)| format!("{pkg}.init#{n}"));

    let wrapper = prop_oneof![Just(""), Just("$bound"), Just("$thunk")];
    let plain = prop_oneof![
        (package_path(), ident(), wrapper.clone())
            .prop_map(|(pkg, name, w)| format!("{pkg}.{name}{w}")),
        (package_path(), ident(), foreign_args())
            .prop_map(|(pkg, name, args)| format!("{pkg}.{name}{args}")),
        (package_path(), receiver_text(any::<bool>()), ident(), wrapper.clone())
            .prop_map(|(pkg, recv, name, w)| format!("{pkg}.{recv}.{name}{w}")),
        (package_path(), any::<bool>(), ident(), ident(), wrapper).prop_map(
            |(pkg, ptr, ty, name, w)| format!("({}{pkg}.{ty}).{name}{w}", if ptr { "*" } else { "" })
        ),
    ];
    let closures = prop::collection::vec(1u32..1000, 0..4);
    let callable = (plain, closures).prop_map(|(mut name, closures)| {
        for n in closures {
            name.push_str(&format!("${n}"));
        }
        name
    });

    let location = prop::option::of(("[a-z]{1,6}", 1u32..500, 1u32..80));
    (prop_oneof![1 => init, 5 => callable], location).prop_map(|(name, loc)| match loc {
        Some((file, line, col)) => format!("{name}@{file}.go:{line}:{col}"),
        None => name,
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn lexer_never_panics_and_progresses(s in ".*") {
        let lx = Lexer::new(&s);
        let mut last_end = 0usize;
        let max_steps = s.len() + 1;

        for (steps, (start, tok, end)) in lx.enumerate() {
            prop_assert!(start < end, "empty token: ({start},{end}) tok={tok:?} input={s:?}");
            prop_assert!(end <= s.len(), "end out of bounds: ({start},{end}) input={s:?}");
            prop_assert!(start >= last_end, "token moved backwards: tok={tok:?} input={s:?}");
            prop_assert!(steps <= max_steps, "too many steps: input={s:?}");
            last_end = end;
        }
    }

    #[test]
    fn parser_never_panics(s in "[a-z.()*\\[\\]@{}:,· ]{0,24}|.*") {
        let _ = parse(&s);
    }

    #[test]
    fn errors_point_into_the_input(s in "[a-z.()*\\[\\]@{}:, ]{0,24}") {
        if let Err(err) = parse(&s) {
            prop_assert!(err.span.range().end <= s.len(), "span out of bounds: {err:?}");
            prop_assert_eq!(err.fragment.as_str(), s.get(err.span.range()).unwrap_or_default());
        }
    }

    #[test]
    fn format_then_parse_is_identity(sym in symbol()) {
        let text = format(&sym);
        let back = parse(&text);
        prop_assert_eq!(back.as_ref(), Ok(&sym), "text={}", text);
    }

    #[test]
    fn empty_metadata_never_renders_braces(sym in symbol()) {
        let sym = Symbol { metadata: Metadata::default(), ..sym };
        let text = format(&sym);
        prop_assert!(!text.contains('{') && !text.contains('}'), "text={}", text);
    }

    #[test]
    fn custom_order_is_irrelevant(
        entries in prop::collection::vec(("[a-z]{1,6}", "[a-z0-9]{1,6}"), 0..6),
    ) {
        let mut forward = Metadata::default();
        for (k, v) in &entries {
            forward.custom.insert(k.clone(), v.clone());
        }
        let mut backward = Metadata::default();
        for (k, v) in entries.iter().rev() {
            backward.custom.entry(k.clone()).or_insert_with(|| v.clone());
        }

        let a = Symbol::function("pkg", "F").with_metadata(forward);
        let b = Symbol::function("pkg", "F").with_metadata(backward);
        prop_assert_eq!(format(&a), format(&b));
    }

    #[test]
    fn trace_self_round_trip(frame in trace_frame()) {
        let sym = from_trace(&frame);
        prop_assert!(sym.is_ok(), "frame={} err={:?}", frame, sym);
        if let Ok(sym) = sym {
            let encoded = to_trace(&sym);
            let reparsed = from_trace(&encoded);
            prop_assert_eq!(reparsed.as_ref(), Ok(&sym), "frame={} encoded={}", frame, encoded);
        }
    }

    #[test]
    fn ssa_self_round_trip(name in ssa_name()) {
        let sym = from_ssa(&name);
        prop_assert!(sym.is_ok(), "name={} err={:?}", name, sym);
        if let Ok(sym) = sym {
            let encoded = to_ssa(&sym);
            let reparsed = from_ssa(&encoded);
            prop_assert_eq!(reparsed.as_ref(), Ok(&sym), "name={} encoded={}", name, encoded);
        }
    }
}
