use arbitrary::Unstructured;
use arbtest::{arbitrary, arbtest};
use rrb_vector::{Const, Error, LinearVector, Sequence, ValidBranchingConstant, Vector};

#[derive(arbitrary::Arbitrary, Debug)]
enum Op {
    Push(u32),
    PushFront(u32),
    Extend(Vec<u32>),
    // Takes a snapshot, and checks at the end that it wasn't affected by
    // anything that happened afterwards.
    Fork,
    PushForked(u32),
    Nth(usize),
}

type Snapshots<const N: usize> = Vec<(Vector<u32, N>, Vec<u32>)>;

impl Op {
    fn apply<const N: usize>(
        &self,
        vec: &mut Vec<u32>,
        vector: &mut LinearVector<u32, N>,
        snapshots: &mut Snapshots<N>,
    ) where
        Const<N>: ValidBranchingConstant,
    {
        match self {
            Op::Push(x) => {
                vec.push(*x);
                vector.push(*x);
            }
            Op::PushFront(x) => {
                vec.insert(0, *x);
                vector.push_front(*x);
            }
            Op::Extend(xs) => {
                vec.extend_from_slice(xs);
                vector.extend(xs.iter().copied());
            }
            Op::Fork => {
                let forked = std::mem::take(vector).into_forked();
                snapshots.push((forked.clone(), vec.clone()));
                *vector = forked.into_linear();
            }
            Op::PushForked(x) => {
                let forked = std::mem::take(vector).into_forked();
                let pushed = forked.push_back(*x);
                snapshots.push((forked, vec.clone()));
                vec.push(*x);
                *vector = pushed.into_linear();
            }
            Op::Nth(idx) => {
                let idx = idx % (vec.len() + 2);
                match vec.get(idx) {
                    Some(x) => assert_eq!(vector.nth(idx), Ok(x)),
                    None => assert_eq!(
                        vector.nth(idx),
                        Err(Error::OutOfRange {
                            index: idx,
                            len: vec.len()
                        })
                    ),
                }
            }
        }
    }
}

// u.arbitrary() generates very short vecs by default:
// https://github.com/matklad/arbtest/issues/8
fn arb_vec(u: &mut Unstructured<'_>) -> arbitrary::Result<Vec<u32>> {
    let len = u.arbitrary_len::<u32>()?;
    std::iter::from_fn(|| Some(u.arbitrary::<u32>()))
        .take(len)
        .collect()
}

fn assert_same<const N: usize>(vec: &[u32], vector: &Vector<u32, N>)
where
    Const<N>: ValidBranchingConstant,
{
    vector.check_invariants();
    assert_eq!(vector.len(), vec.len());
    assert_eq!(vector.iter().len(), vec.len());
    assert_eq!(vec, vector.iter().copied().collect::<Vec<_>>());
    for (i, x) in vec.iter().enumerate() {
        assert_eq!(vector.nth(i), Ok(x));
    }
}

#[test]
fn mutations() {
    let _ = env_logger::try_init();

    arbtest(|u| {
        let mut vec: Vec<u32> = arb_vec(u)?;
        let mut vector: LinearVector<u32, 4> = vec.iter().copied().collect();
        let mut snapshots = Vec::new();
        let ops: Vec<Op> = u.arbitrary()?;

        for op in ops {
            op.apply(&mut vec, &mut vector, &mut snapshots);

            vector.check_invariants();
            assert_eq!(vec, vector.iter().copied().collect::<Vec<_>>());
        }

        for (snapshot, expected) in &snapshots {
            assert_same(expected, snapshot);
        }

        Ok(())
    });
}

#[test]
fn appends_stay_strict() {
    arbtest(|u| {
        let vec: Vec<u32> = arb_vec(u)?;

        let small: Vector<u32, 4> = vec.iter().copied().collect();
        assert!(small.is_strict());
        assert_same(&vec, &small);

        let wide: Vector<u32> = vec.iter().copied().collect();
        assert!(wide.is_strict());
        assert_same(&vec, &wide);

        Ok(())
    });
}

#[test]
fn nth_matches_position() {
    arbtest(|u| {
        let len = u.int_in_range(0..=5000)?;
        let vector: Vector<u32> = (0..len).collect();

        for i in 0..len {
            assert_eq!(vector.nth(i as usize), Ok(&i));
        }
        let past_end = len as usize + u.int_in_range(0..=100)?;
        assert_eq!(
            vector.nth(past_end),
            Err(Error::OutOfRange {
                index: past_end,
                len: len as usize
            })
        );

        Ok(())
    });
}

#[test]
fn forking_is_non_destructive() {
    arbtest(|u| {
        let base: Vec<u32> = arb_vec(u)?;
        let extra: Vec<u32> = arb_vec(u)?;

        let a: Vector<u32, 8> = base.iter().copied().collect();
        let mut linear = a.clone().into_linear();
        linear.extend(extra.iter().copied());
        let b = linear.into_forked();

        assert_same(&base, &a);
        assert!(b.iter().take(a.len()).eq(a.iter()));
        assert!(b.iter().skip(a.len()).eq(extra.iter()));

        Ok(())
    });
}

#[test]
fn nth_or_default() {
    arbtest(|u| {
        let vec: Vec<u32> = arb_vec(u)?;
        let vector: Vector<u32, 4> = vec.iter().copied().collect();
        let idx = u.int_in_range(0..=vec.len() + 4)?;

        let expected = match idx {
            0 => &u32::MAX,
            i => vec.get(i).unwrap_or(&u32::MAX),
        };
        assert_eq!(vector.nth_or_default(idx, &u32::MAX), expected);

        Ok(())
    });
}
