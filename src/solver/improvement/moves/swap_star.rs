use std::ptr;

use crate::constants::EPSILON;
use crate::models::{FloatType, IntType};
use crate::solver::improvement::linked_list::{LinkNode, LinkRoute};
use crate::solver::improvement::LocalSearch;

pub struct BestSwapStar {
    pub cost: FloatType,
    pub u: *mut LinkNode,
    pub v: *mut LinkNode,
    // Best position to insert `u` is right after `pos_u`
    pub pos_u: *mut LinkNode,
    // Best position to insert `v` is right after `pos_v`
    pub pos_v: *mut LinkNode,
}

impl BestSwapStar {
    pub fn new() -> Self {
        Self {
            cost: FloatType::INFINITY,
            u: ptr::null_mut(),
            v: ptr::null_mut(),
            pos_u: ptr::null_mut(),
            pos_v: ptr::null_mut(),
        }
    }
}

pub struct SwapStar;

impl SwapStar {
    pub fn move_name() -> &'static str {
        "SwapStar"
    }

    pub unsafe fn run(ls: &mut LocalSearch, r1_ptr: *mut LinkRoute, r2_ptr: *mut LinkRoute) -> bool {
        let mut best_move = BestSwapStar::new();
        let penalty = ls.evaluator.load_penalty;
        let r1 = &*r1_ptr;
        let r2 = &*r2_ptr;
        let mut u_ptr = (*r1.start_depot).successor;

        ls.preprocess_insertions(r1_ptr, r2_ptr);
        ls.preprocess_insertions(r2_ptr, r1_ptr);

        while !(*u_ptr).is_depot() {
            let u = &*u_ptr;
            let u_demand = ls.ctx.problem.location(u.number).demand;
            let mut v_ptr = (*r2.start_depot).successor;
            while !(*v_ptr).is_depot() {
                let v = &*v_ptr;
                let v_demand = ls.ctx.problem.location(v.number).demand;

                let delta_penalty_r1 = 0.max(r1.overload as IntType - u_demand + v_demand) as FloatType
                    * penalty
                    - 0.max(r1.overload as IntType) as FloatType * penalty;
                let delta_penalty_r2 = 0.max(r2.overload as IntType + u_demand - v_demand) as FloatType
                    * penalty
                    - 0.max(r2.overload as IntType) as FloatType * penalty;

                if u.delta_removal as FloatType
                    + v.delta_removal as FloatType
                    + delta_penalty_r1
                    + delta_penalty_r2
                    <= 0.0
                {
                    let mut m = BestSwapStar::new();
                    m.u = u_ptr;
                    m.v = v_ptr;

                    let (best_pos_u, delta_insertion_u) = ls.cheapest_insert_and_removal(u_ptr, v_ptr);
                    let (best_pos_v, delta_insertion_v) = ls.cheapest_insert_and_removal(v_ptr, u_ptr);
                    m.pos_u = best_pos_u;
                    m.pos_v = best_pos_v;
                    m.cost = u.delta_removal as FloatType
                        + delta_penalty_r1
                        + delta_insertion_u
                        + v.delta_removal as FloatType
                        + delta_penalty_r2
                        + delta_insertion_v;

                    if m.cost < best_move.cost {
                        best_move = m;
                    }
                }

                v_ptr = v.successor;
            }
            u_ptr = u.successor;
        }

        // Also consider relocating u into r2 (and v into r1) alone, reusing
        // the insertion costs already computed above.
        let mut u_ptr = (*r1.start_depot).successor;
        while !(*u_ptr).is_depot() {
            let u = &*u_ptr;
            let u_demand = ls.ctx.problem.location(u.number).demand;
            let mut m = BestSwapStar::new();
            m.u = u_ptr;
            let best_insert = &ls.best_inserts.get(r2.index, u.number).locations[0];
            m.pos_u = best_insert.node;
            let delta_penalty_r1 = 0.max(r1.overload as IntType - u_demand) as FloatType * penalty
                - 0.max(r1.overload as IntType) as FloatType * penalty;
            let delta_penalty_r2 = 0.max(r2.overload as IntType + u_demand) as FloatType * penalty
                - 0.max(r2.overload as IntType) as FloatType * penalty;
            m.cost = u.delta_removal as FloatType + best_insert.cost + delta_penalty_r1 + delta_penalty_r2;

            if m.cost < best_move.cost {
                best_move = m;
            }

            u_ptr = u.successor;
        }

        let mut v_ptr = (*r2.start_depot).successor;
        while !(*v_ptr).is_depot() {
            let v = &*v_ptr;
            let v_demand = ls.ctx.problem.location(v.number).demand;
            let mut m = BestSwapStar::new();
            m.v = v_ptr;
            let best_insert = &ls.best_inserts.get(r1.index, v.number).locations[0];
            m.pos_v = best_insert.node;
            let delta_penalty_r1 = 0.max(r1.overload as IntType + v_demand) as FloatType * penalty
                - 0.max(r1.overload as IntType) as FloatType * penalty;
            let delta_penalty_r2 = 0.max(r2.overload as IntType - v_demand) as FloatType * penalty
                - 0.max(r2.overload as IntType) as FloatType * penalty;
            m.cost = v.delta_removal as FloatType + best_insert.cost + delta_penalty_r1 + delta_penalty_r2;

            if m.cost < best_move.cost {
                best_move = m;
            }

            v_ptr = v.successor;
        }

        if best_move.cost > -EPSILON {
            return false;
        }

        ls.move_count += 1;

        if !best_move.pos_u.is_null() {
            LinkNode::insert_node(best_move.u, best_move.pos_u);
        }
        if !best_move.pos_v.is_null() {
            LinkNode::insert_node(best_move.v, best_move.pos_v);
        }

        ls.update_route(r1_ptr);
        ls.update_route(r2_ptr);

        true
    }
}
