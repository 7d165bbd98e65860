use analysis::clutch::ClutchTier;
use analysis::round::RoundStats;
use common::events::Side;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

mod util;

#[test]
fn alive_counts_from_lineup() {
    let participants = vec![
        util::t(1, "a"),
        util::t(2, "b"),
        util::dead(&util::t(3, "c")),
        util::ct(11, "d"),
        util::player(20, "caster", Side::Spectators),
    ];

    let round = RoundStats::new(&participants, Vec::<(u64, Side)>::new());

    assert_eq!(2, round.alive(Side::Terrorists));
    assert_eq!(1, round.alive(Side::CounterTerrorists));
    assert_eq!(0, round.alive(Side::Spectators));
    assert_eq!(4, round.lineup.len());
}

#[test]
#[traced_test]
fn alive_count_never_goes_negative() {
    let victim = util::ct(11, "victim");
    let mut round = RoundStats::new(&[util::t(1, "a"), victim.clone()], Vec::<(u64, Side)>::new());

    assert_eq!(Some(0), round.on_kill(&victim));
    // Joined after the round started, so not part of the lineup.
    assert_eq!(Some(0), round.on_kill(&util::ct(12, "joiner")));
    assert!(logs_contain("Alive count would go negative"));

    let spectator = util::player(20, "caster", Side::Spectators);
    assert_eq!(None, round.on_kill(&spectator));

    round.end();
    assert_eq!(None, round.on_kill(&util::t(1, "a")));
    assert_eq!(1, round.alive(Side::Terrorists));
}

#[test]
fn three_kills_leave_one_clutching_ct() {
    let a = util::t(1, "a");
    let c1 = util::ct(11, "c1");
    let c2 = util::ct(12, "c2");
    let c3 = util::ct(13, "c3");
    let players = vec![a.clone(), c1.clone(), c2.clone(), c3.clone()];

    let mut aggregator = util::new_aggregator();
    util::feed(
        &mut aggregator,
        &[
            util::match_start(&players),
            util::round_start(&players),
            util::kill(&a, &c1),
        ],
    );
    assert_eq!(2, aggregator.round().unwrap().alive(Side::CounterTerrorists));

    util::feed(&mut aggregator, &[util::kill(&a, &c2)]);
    let round = aggregator.round().unwrap();
    assert_eq!(1, round.alive(Side::CounterTerrorists));
    assert_eq!(Some(13), round.clutch.map(|c| c.player));
    assert_eq!(1, util::score(&aggregator, 13).clutches.attempts(ClutchTier::ONE));

    util::feed(
        &mut aggregator,
        &[
            util::kill(&a, &c3),
            util::round_end(Side::Terrorists, 1, &players, (1, 0)),
        ],
    );
    assert_eq!(0, aggregator.round().unwrap().alive(Side::CounterTerrorists));

    let clutcher = util::score(&aggregator, 13);
    assert_eq!([1, 0, 0, 0, 0], clutcher.clutches.attempts);
    assert_eq!([0, 0, 0, 0, 0], clutcher.clutches.wins);

    let killer = util::score(&aggregator, 1);
    assert_eq!(3, killer.kills);
    assert_eq!(1, killer.multi_kills.k3);
    assert_eq!(1, killer.entry_count);
    assert_eq!(1, killer.entry_wins);
    assert_eq!(1, killer.kast_rounds);
    assert_eq!(1, util::score(&aggregator, 11).entry_count);
    assert_eq!(0, util::score(&aggregator, 12).entry_count);
}

#[test]
#[traced_test]
fn repeated_kill_of_a_dead_player_is_ignored() {
    let a = util::t(1, "a");
    let b = util::t(2, "b");
    let c1 = util::ct(11, "c1");
    let c2 = util::ct(12, "c2");
    let c3 = util::ct(13, "c3");
    let players = vec![a.clone(), b.clone(), c1.clone(), c2.clone(), c3.clone()];

    let mut aggregator = util::new_aggregator();
    util::feed(
        &mut aggregator,
        &[
            util::match_start(&players),
            util::round_start(&players),
            util::kill(&a, &c1),
            util::kill(&a, &c1),
        ],
    );

    assert!(logs_contain("already dead"));
    let round = aggregator.round().unwrap();
    assert_eq!(2, round.alive(Side::CounterTerrorists));
    assert_eq!(None, round.clutch);
    assert_eq!([0, 0, 0, 0, 0], util::score(&aggregator, 12).clutches.attempts);
    assert_eq!([0, 0, 0, 0, 0], util::score(&aggregator, 13).clutches.attempts);
}

#[test]
fn clutch_and_one_vs_one_are_credited_to_the_winner() {
    let a = util::t(1, "a");
    let b = util::t(2, "b");
    let c = util::ct(11, "c");
    let d = util::ct(12, "d");
    let players = vec![a.clone(), b.clone(), c.clone(), d.clone()];

    let mut aggregator = util::new_aggregator();
    util::feed(
        &mut aggregator,
        &[
            util::match_start(&players),
            util::round_start(&players),
            // d is left alone against two
            util::kill(&a, &c),
            // a is left alone against d
            util::kill(&d, &b),
            util::kill(&a, &d),
            util::round_end(Side::Terrorists, 1, &players, (1, 0)),
        ],
    );

    let d = util::score(&aggregator, 12);
    assert_eq!([0, 1, 0, 0, 0], d.clutches.attempts);
    assert_eq!([0, 0, 0, 0, 0], d.clutches.wins);

    let a = util::score(&aggregator, 1);
    assert_eq!([1, 0, 0, 0, 0], a.clutches.attempts);
    assert_eq!([1, 0, 0, 0, 0], a.clutches.wins);
    assert_eq!(1, a.clutches.wins(ClutchTier::ONE));
    assert_eq!(0, a.clutches.wins(ClutchTier::new(2).unwrap()));
}

#[test]
fn kill_order_decides_the_clutching_player() {
    let a = util::t(1, "a");
    let b = util::t(2, "b");
    let c = util::ct(11, "c");
    let d = util::ct(12, "d");
    let players = vec![a.clone(), b.clone(), c.clone(), d.clone()];

    let mut aggregator = util::new_aggregator();
    util::feed(
        &mut aggregator,
        &[
            util::match_start(&players),
            util::round_start(&players),
            util::kill(&d, &b),
            util::kill(&a, &c),
        ],
    );

    let round = aggregator.round().unwrap();
    assert_eq!(Some(1), round.clutch.map(|c| c.player));
    assert_eq!(Some(12), round.clutch_1v1.as_ref().map(|l| l.player));
    assert_eq!(1, util::score(&aggregator, 1).clutches.attempts[1]);
    assert_eq!(1, util::score(&aggregator, 12).clutches.attempts[0]);
}

#[test]
fn clutch_state_resets_every_round() {
    let a = util::t(1, "a");
    let b = util::t(2, "b");
    let c = util::ct(11, "c");
    let players = vec![a.clone(), b.clone(), c.clone()];

    let mut aggregator = util::new_aggregator();
    util::feed(
        &mut aggregator,
        &[
            util::match_start(&players),
            util::round_start(&players),
            util::kill(&c, &a),
            util::kill(&c, &b),
            util::round_end(Side::CounterTerrorists, 1, &players, (0, 1)),
            util::round_start(&players),
        ],
    );
    assert_eq!(None, aggregator.round().unwrap().clutch);

    util::feed(&mut aggregator, &[util::kill(&c, &b)]);

    assert_eq!([1, 0, 0, 0, 0], util::score(&aggregator, 1).clutches.attempts);
    assert_eq!([1, 0, 0, 0, 0], util::score(&aggregator, 2).clutches.attempts);
    assert_eq!(Some(1), aggregator.round().unwrap().clutch.map(|c| c.player));
}

#[test]
fn clutch_tiers_are_bounded() {
    assert_eq!(None, ClutchTier::new(0));
    assert_eq!(Some(1), ClutchTier::new(1).map(|t| t.get()));
    assert_eq!(Some(5), ClutchTier::new(5).map(|t| t.get()));
    assert_eq!(None, ClutchTier::new(6));
}
